use gp_core::error::{GpError, Result};
use gp_core::traits::TrackpadSource;
use gp_core::types::{TouchFrame, TouchPhase, TouchPoint};

// Linux Implementation
#[cfg(target_os = "linux")]
pub mod linux {
    use super::*;
    use async_trait::async_trait;
    use std::fs::{File, OpenOptions};
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tracing::info;

    const MAX_SLOTS: usize = 10;

    #[derive(Debug, Clone, Copy)]
    struct SlotState {
        tracking_id: i32,
        x_raw: i32,
        y_raw: i32,
        active: bool,
        just_made: bool,
        just_broke: bool,
    }

    impl Default for SlotState {
        fn default() -> Self {
            Self {
                tracking_id: -1,
                x_raw: 0,
                y_raw: 0,
                active: false,
                just_made: false,
                just_broke: false,
            }
        }
    }

    /// evdev multitouch reader: decodes ABS_MT slot reports into normalized
    /// touch frames. One frame per SYN_REPORT.
    pub struct EvdevTrackpad {
        path: PathBuf,
        file: Option<File>,
        slots: [SlotState; MAX_SLOTS],
        current_slot: usize,
        // Raw axis ranges; kernels report MT positions in device units.
        x_range: (i32, i32),
        y_range: (i32, i32),
    }

    impl EvdevTrackpad {
        pub fn new(path: &Path) -> Self {
            Self {
                path: path.to_path_buf(),
                file: None,
                slots: [SlotState::default(); MAX_SLOTS],
                current_slot: 0,
                x_range: (0, 4096),
                y_range: (0, 4096),
            }
        }

        pub fn set_axis_ranges(&mut self, x: (i32, i32), y: (i32, i32)) {
            self.x_range = (x.0, x.1.max(x.0 + 1));
            self.y_range = (y.0, y.1.max(y.0 + 1));
        }

        fn apply(&mut self, event: &input_linux::sys::input_event) -> bool {
            use input_linux::sys;

            if event.type_ == sys::EV_SYN as u16 {
                return event.code == sys::SYN_REPORT as u16;
            }
            if event.type_ != sys::EV_ABS as u16 {
                return false;
            }

            let code = event.code;
            if code == sys::ABS_MT_SLOT as u16 {
                self.current_slot = (event.value.max(0) as usize).min(MAX_SLOTS - 1);
            } else if code == sys::ABS_MT_TRACKING_ID as u16 {
                let slot = &mut self.slots[self.current_slot];
                if event.value < 0 {
                    if slot.active {
                        slot.just_broke = true;
                    }
                    slot.tracking_id = -1;
                    slot.active = false;
                } else {
                    slot.tracking_id = event.value;
                    slot.active = true;
                    slot.just_made = true;
                }
            } else if code == sys::ABS_MT_POSITION_X as u16 {
                self.slots[self.current_slot].x_raw = event.value;
            } else if code == sys::ABS_MT_POSITION_Y as u16 {
                self.slots[self.current_slot].y_raw = event.value;
            }
            false
        }

        fn build_frame(&mut self) -> TouchFrame {
            let (x_min, x_max) = self.x_range;
            let (y_min, y_max) = self.y_range;
            let mut touches = Vec::new();

            for slot in self.slots.iter_mut() {
                let live = slot.active && slot.tracking_id >= 0;
                if !live && !slot.just_broke {
                    continue;
                }
                let x = f64::from(slot.x_raw - x_min) / f64::from(x_max - x_min);
                let y = f64::from(slot.y_raw - y_min) / f64::from(y_max - y_min);
                let phase = if slot.just_broke {
                    TouchPhase::Breaking
                } else if slot.just_made {
                    TouchPhase::Making
                } else {
                    TouchPhase::Touching
                };
                touches.push(TouchPoint {
                    x: x.clamp(0.0, 1.0),
                    y: y.clamp(0.0, 1.0),
                    phase,
                });
                slot.just_made = false;
                slot.just_broke = false;
            }

            TouchFrame { touches }
        }

        /// Drains whatever is queued; returns a frame when a SYN_REPORT
        /// closed one.
        fn poll_frame(&mut self) -> Result<Option<TouchFrame>> {
            let Some(file) = &self.file else {
                return Err(GpError::Platform("trackpad not started".to_string()));
            };
            const EV_SIZE: usize = std::mem::size_of::<input_linux::sys::input_event>();
            let mut buf = [0u8; EV_SIZE * 64];
            let fd = file.as_raw_fd();

            loop {
                let n = unsafe {
                    libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
                };
                if n <= 0 {
                    return Ok(None);
                }
                let count = n as usize / EV_SIZE;
                for i in 0..count {
                    let event: input_linux::sys::input_event = unsafe {
                        std::ptr::read_unaligned(
                            buf.as_ptr().add(i * EV_SIZE)
                                as *const input_linux::sys::input_event,
                        )
                    };
                    if self.apply(&event) {
                        return Ok(Some(self.build_frame()));
                    }
                }
            }
        }
    }

    #[async_trait]
    impl TrackpadSource for EvdevTrackpad {
        async fn start(&mut self) -> Result<()> {
            let file = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&self.path)
                .map_err(|e| {
                    GpError::Platform(format!(
                        "Failed to open {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
            self.file = Some(file);
            info!("✅ Trackpad device open: {}", self.path.display());
            Ok(())
        }

        async fn next_frame(&mut self) -> Result<TouchFrame> {
            loop {
                if let Some(frame) = self.poll_frame()? {
                    return Ok(frame);
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn ev(type_: u32, code: u32, value: i32) -> input_linux::sys::input_event {
            input_linux::sys::input_event {
                time: input_linux::sys::timeval {
                    tv_sec: 0,
                    tv_usec: 0,
                },
                type_: type_ as u16,
                code: code as u16,
                value,
            }
        }

        #[test]
        fn test_slot_decoding_builds_normalized_frame() {
            use input_linux::sys;
            let mut pad = EvdevTrackpad::new(Path::new("/dev/null"));
            pad.set_axis_ranges((0, 4096), (0, 4096));

            assert!(!pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_SLOT as u32, 0)));
            assert!(!pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_TRACKING_ID as u32, 7)));
            assert!(!pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_X as u32, 2048)));
            assert!(!pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_Y as u32, 1024)));
            assert!(pad.apply(&ev(sys::EV_SYN as u32, sys::SYN_REPORT as u32, 0)));

            let frame = pad.build_frame();
            assert_eq!(frame.touches.len(), 1);
            let touch = frame.touches[0];
            assert!((touch.x - 0.5).abs() < 1e-9);
            assert!((touch.y - 0.25).abs() < 1e-9);
            assert_eq!(touch.phase, TouchPhase::Making);
        }

        #[test]
        fn test_release_emits_breaking_then_empty() {
            use input_linux::sys;
            let mut pad = EvdevTrackpad::new(Path::new("/dev/null"));

            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_SLOT as u32, 0));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_TRACKING_ID as u32, 3));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_X as u32, 100));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_Y as u32, 100));
            let first = pad.build_frame();
            assert_eq!(first.contact_count(), 1);

            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_TRACKING_ID as u32, -1));
            let second = pad.build_frame();
            assert_eq!(second.touches.len(), 1);
            assert_eq!(second.touches[0].phase, TouchPhase::Breaking);

            let third = pad.build_frame();
            assert!(third.touches.is_empty());
        }

        #[test]
        fn test_two_finger_frame() {
            use input_linux::sys;
            let mut pad = EvdevTrackpad::new(Path::new("/dev/null"));

            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_SLOT as u32, 0));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_TRACKING_ID as u32, 1));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_X as u32, 1000));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_Y as u32, 1000));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_SLOT as u32, 1));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_TRACKING_ID as u32, 2));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_X as u32, 3000));
            pad.apply(&ev(sys::EV_ABS as u32, sys::ABS_MT_POSITION_Y as u32, 1000));

            let frame = pad.build_frame();
            assert_eq!(frame.contact_count(), 2);
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux::EvdevTrackpad;

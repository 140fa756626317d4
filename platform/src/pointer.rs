use gp_core::error::{GpError, Result};
use gp_core::traits::{CursorSink, PointerSource};
use gp_core::types::{Point, Rect};

// Linux Implementation
#[cfg(target_os = "linux")]
pub mod linux {
    use super::*;
    use input_linux::{
        uinput::UInputHandle, AbsoluteAxis, AbsoluteInfo, AbsoluteInfoSetup, EventKind, Key,
        SynchronizeKind,
    };
    use std::fs::{File, OpenOptions};
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;
    use tracing::debug;

    const ABS_RANGE: i32 = 65_535;

    /// uinput virtual pointer: the warp sink. The virtual cursor position is
    /// mirrored out as absolute-axis events, which survive multi-display
    /// layouts because the axis spans the whole desktop.
    pub struct VirtualCursor {
        handle: UInputHandle<File>,
        desktop: Rect,
        hidden: bool,
    }

    impl VirtualCursor {
        pub fn new(desktop: Rect) -> Result<Self> {
            let path = Path::new(gp_core::constants::UINPUT_PATH);

            // Needs permissions on /dev/uinput.
            let file = OpenOptions::new()
                .write(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(path)
                .map_err(|e| GpError::Platform(format!("Failed to open /dev/uinput: {}", e)))?;

            let handle = UInputHandle::new(file);

            handle.set_evbit(EventKind::Key).map_err(map_err)?;
            handle.set_evbit(EventKind::Absolute).map_err(map_err)?;
            handle.set_evbit(EventKind::Synchronize).map_err(map_err)?;

            // A pointer needs at least one button for compositors to treat
            // the device as a pointer.
            handle.set_keybit(Key::ButtonLeft).map_err(map_err)?;

            handle.set_absbit(AbsoluteAxis::X).map_err(map_err)?;
            handle.set_absbit(AbsoluteAxis::Y).map_err(map_err)?;

            let abs_info = AbsoluteInfo {
                value: 0,
                minimum: 0,
                maximum: ABS_RANGE,
                fuzz: 0,
                flat: 0,
                resolution: 0,
            };
            let abs_setup = [
                AbsoluteInfoSetup {
                    axis: AbsoluteAxis::X,
                    info: abs_info,
                },
                AbsoluteInfoSetup {
                    axis: AbsoluteAxis::Y,
                    info: abs_info,
                },
            ];

            let input_id = input_linux::InputId {
                bustype: input_linux::sys::BUS_USB,
                vendor: 0x1234,
                product: 0x5678,
                version: 1,
            };

            handle
                .create(&input_id, b"GlidePointer Virtual Cursor", 0, &abs_setup)
                .map_err(map_err)?;

            Ok(Self {
                handle,
                desktop,
                hidden: false,
            })
        }

        pub fn set_desktop(&mut self, desktop: Rect) {
            self.desktop = desktop;
        }

        pub fn is_hidden(&self) -> bool {
            self.hidden
        }

        fn write_events(&mut self, events: &[input_linux::sys::input_event]) -> Result<()> {
            self.handle.write(events).map_err(map_err)?;
            Ok(())
        }
    }

    impl CursorSink for VirtualCursor {
        fn warp(&mut self, p: Point) -> Result<()> {
            // Global screen space → 0..65535 axis space, like any tablet.
            let w = self.desktop.w.max(1.0);
            let h = self.desktop.h.max(1.0);
            let abs_x = (((p.x - self.desktop.x) / w) * ABS_RANGE as f64)
                .clamp(0.0, ABS_RANGE as f64) as i32;
            let abs_y = (((p.y - self.desktop.y) / h) * ABS_RANGE as f64)
                .clamp(0.0, ABS_RANGE as f64) as i32;

            self.write_events(&[
                make_event(EventKind::Absolute, AbsoluteAxis::X as u16, abs_x),
                make_event(EventKind::Absolute, AbsoluteAxis::Y as u16, abs_y),
                make_event(EventKind::Synchronize, SynchronizeKind::Report as u16, 0),
            ])
        }

        fn hide(&mut self) -> Result<()> {
            // Cursor artwork visibility belongs to the compositor; the
            // intent is tracked so shutdown can restore it.
            self.hidden = true;
            debug!("OS cursor hide requested");
            Ok(())
        }

        fn show(&mut self) -> Result<()> {
            self.hidden = false;
            debug!("OS cursor show requested");
            Ok(())
        }
    }

    fn map_err(e: std::io::Error) -> GpError {
        GpError::Platform(format!("uinput error: {}", e))
    }

    fn make_event(kind: EventKind, code: u16, value: i32) -> input_linux::sys::input_event {
        input_linux::sys::input_event {
            time: input_linux::sys::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: kind as u16,
            code,
            value,
        }
    }

    /// Physical pointer source: integrates relative motion from an evdev
    /// mouse node. Reads are non-blocking; each `location()` drains
    /// whatever the kernel has queued since the last tick.
    pub struct EvdevPointer {
        file: File,
        position: Point,
        desktop: Rect,
    }

    impl EvdevPointer {
        pub fn open(path: &Path, desktop: Rect) -> Result<Self> {
            let file = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(path)
                .map_err(|e| {
                    GpError::Platform(format!("Failed to open {}: {}", path.display(), e))
                })?;
            Ok(Self {
                file,
                position: desktop.center(),
                desktop,
            })
        }

        fn drain(&mut self) {
            const EV_SIZE: usize = std::mem::size_of::<input_linux::sys::input_event>();
            let mut buf = [0u8; EV_SIZE * 64];
            loop {
                let n = unsafe {
                    libc::read(
                        self.file.as_raw_fd(),
                        buf.as_mut_ptr() as *mut libc::c_void,
                        buf.len(),
                    )
                };
                if n <= 0 {
                    break;
                }
                let count = n as usize / EV_SIZE;
                for i in 0..count {
                    let event: input_linux::sys::input_event = unsafe {
                        std::ptr::read_unaligned(
                            buf.as_ptr().add(i * EV_SIZE)
                                as *const input_linux::sys::input_event,
                        )
                    };
                    self.apply(&event);
                }
            }
        }

        fn apply(&mut self, event: &input_linux::sys::input_event) {
            if event.type_ != input_linux::sys::EV_REL as u16 {
                return;
            }
            if event.code == input_linux::sys::REL_X as u16 {
                self.position.x += f64::from(event.value);
            } else if event.code == input_linux::sys::REL_Y as u16 {
                self.position.y += f64::from(event.value);
            }
            self.position = self.desktop.clamp_point(self.position);
        }
    }

    impl PointerSource for EvdevPointer {
        fn location(&mut self) -> Result<Point> {
            self.drain();
            Ok(self.position)
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux::{EvdevPointer, VirtualCursor};

pub const TICK_HZ: f64 = 500.0;
pub const MIN_TICK_DT: f64 = 1.0 / TICK_HZ;
pub const POINTER_OVERLAY_ADDR: &str = "127.0.0.1:7878";
pub const UINPUT_PATH: &str = "/dev/uinput";

pub mod config_utils;


pub use plasticparser_core::logging::{setup_with_level, setup_with_level_location, FilterLevel, error, debug, info, warn};


#[macro_export]
macro_rules! duration_us {
    ($exp:expr) => {{
        $exp.elapsed().as_micros()
    }};
}

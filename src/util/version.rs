pub const APP_NAME: &str = "Krishi Dashboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_label() -> String {
    format!("v{APP_VERSION}")
}

/// User agent sent with every upstream data request.
pub fn user_agent() -> String {
    format!("{}/{}", APP_NAME.replace(' ', "-"), version_label())
}

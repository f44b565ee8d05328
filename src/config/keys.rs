//! Recognized configuration keys.
//!
//! Keys are case-sensitive and always carry string values.

pub const ALLOW_LOCAL_HOST: &str = "AllowLocalHost";
pub const USE_USER_MAPPER: &str = "UseUserMapper";
pub const DONT_VERIFY_INTEGRITY: &str = "DontVerifyIntegrity";
pub const DONT_VERIFY_TRUST: &str = "DontVerifyTrust";
pub const VERIFY_TRUST_PATH: &str = "VerifyTrustPath";
pub const USE_RANDOM_SCOPE: &str = "UseRandomScope";
pub const USE_RANDOM_DEVICE_ID: &str = "UseRandomDeviceID";
/// Routes engine system-log entries into the startup log.
pub const DISABLE_CONSOLE: &str = "DisableConsole";

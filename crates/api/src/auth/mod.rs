pub mod captcha;
pub mod cookie;
pub mod jwt;
pub mod password;
pub mod session;

pub mod contact;
pub mod dashboard;
pub mod forgot_password;
pub mod health;
pub mod logout;
pub mod newsletter;
pub mod pages;
pub mod signin;
pub mod signup;

pub use self::contact::contact;
pub use self::dashboard::dashboard;
pub use self::forgot_password::forgot_password;
pub use self::health::health;
pub use self::logout::logout;
pub use self::newsletter::newsletter;
pub use self::pages::show;
pub use self::signin::signin;
pub use self::signup::signup;

/// True when every submitted field is non-empty.
pub(crate) fn all_present(fields: &[&str]) -> bool {
    fields.iter().all(|field| !field.is_empty())
}

#[cfg(test)]
mod tests;

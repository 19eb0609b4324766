/// Shared-credential gate for privileged actions.
///
/// With no credential configured every privileged action is refused.
#[derive(Clone, Debug)]
pub struct PasswordGate {
    secret: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    Disabled,
}

impl PasswordGate {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn check(&self, attempt: Option<&str>) -> Access {
        match (&self.secret, attempt) {
            (None, _) => Access::Disabled,
            (Some(secret), Some(attempt)) if secret == attempt => Access::Granted,
            _ => Access::Denied,
        }
    }
}

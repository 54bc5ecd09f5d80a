use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserId;

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

/// Incoming user body for create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    /// Required on update, ignored on create
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// Validated user fields, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

impl User {
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            email: draft.email,
            login: draft.login,
            name: draft.name,
            birthday: draft.birthday,
        }
    }
}

impl UserPayload {
    /// Checks field constraints and produces a draft.
    ///
    /// Every violated constraint is reported as `field: message`. A blank or
    /// missing display name falls back to the login.
    pub fn into_draft(self, today: NaiveDate) -> Result<UserDraft, Vec<String>> {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push("email: must not be blank".to_string());
        } else if !looks_like_email(&self.email) {
            errors.push("email: must be a well-formed email address".to_string());
        }

        if self.login.trim().is_empty() {
            errors.push("login: must not be blank".to_string());
        } else if self.login.chars().any(char::is_whitespace) {
            errors.push("login: must not contain whitespace".to_string());
        }

        if let Some(birthday) = self.birthday {
            if birthday > today {
                errors.push("birthday: must not be in the future".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.login.clone(),
        };

        Ok(UserDraft {
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
        })
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn payload(email: &str, login: &str, name: Option<&str>) -> UserPayload {
        UserPayload {
            id: None,
            email: email.to_string(),
            login: login.to_string(),
            name: name.map(str::to_string),
            birthday: NaiveDate::from_ymd_opt(1990, 3, 14),
        }
    }

    #[test]
    fn test_valid_payload() {
        let draft = payload("ann@example.com", "ann", Some("Ann"))
            .into_draft(today())
            .unwrap();
        assert_eq!(draft.name, "Ann");
        assert_eq!(draft.login, "ann");
    }

    #[test]
    fn test_blank_name_falls_back_to_login() {
        let draft = payload("ann@example.com", "ann", Some("  "))
            .into_draft(today())
            .unwrap();
        assert_eq!(draft.name, "ann");

        let draft = payload("ann@example.com", "ann", None)
            .into_draft(today())
            .unwrap();
        assert_eq!(draft.name, "ann");
    }

    #[test]
    fn test_login_with_whitespace_is_rejected() {
        let errors = payload("ann@example.com", "ann smith", None)
            .into_draft(today())
            .unwrap_err();
        assert_eq!(errors, vec!["login: must not contain whitespace"]);
    }

    #[test]
    fn test_bad_email_is_rejected() {
        for email in ["", "ann", "ann@", "@example.com", "ann@example", "a nn@example.com"] {
            let result = payload(email, "ann", None).into_draft(today());
            assert!(result.is_err(), "accepted {:?}", email);
        }
    }

    #[test]
    fn test_future_birthday_is_rejected() {
        let mut user = payload("ann@example.com", "ann", None);
        user.birthday = NaiveDate::from_ymd_opt(2030, 1, 1);
        let errors = user.into_draft(today()).unwrap_err();
        assert_eq!(errors, vec!["birthday: must not be in the future"]);
    }

    #[test]
    fn test_all_errors_are_reported() {
        let errors = payload("nope", "", None).into_draft(today()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}

//! Invite tokens and onboarding links.
//!
//! Tokens are two concatenated base-36 fragments. They identify an invite,
//! they are not secrets: collisions are possible but unlikely at the volumes
//! a single contractor sends.

use rand::Rng;

/// Length of each random base-36 fragment.
pub const TOKEN_FRAGMENT_LEN: usize = 13;

/// Total token length.
pub const TOKEN_LEN: usize = TOKEN_FRAGMENT_LEN * 2;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

define_text_enum! {
    /// Invite lifecycle. `sent -> accepted` happens exactly once.
    InviteStatus ("invite status") {
        Sent = "sent",
        Accepted = "accepted",
    }
}

/// Generate a new invite token.
pub fn generate_invite_token() -> String {
    let mut rng = rand::rng();
    let mut fragment = || -> String {
        (0..TOKEN_FRAGMENT_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect()
    };
    let first = fragment();
    let second = fragment();
    format!("{first}{second}")
}

/// Returns `true` if `token` has the shape produced by [`generate_invite_token`].
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| BASE36.contains(&b))
}

/// Build the onboarding link a trade opens to accept an invite.
///
/// `origin` is the public web origin, e.g. `https://app.example.com`.
pub fn invite_link(origin: &str, token: &str) -> String {
    format!("{}/#/Onboarding?invite={token}", origin.trim_end_matches('/'))
}

/// Validate the human-entered part of a new invite.
pub fn validate_invite_input(invited_name: &str, invited_phone: Option<&str>) -> Result<(), String> {
    if invited_name.trim().is_empty() {
        return Err("invited_name must not be empty".to_string());
    }
    if let Some(phone) = invited_phone {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits < 7 {
            return Err(format!("invited_phone '{phone}' must contain at least 7 digits"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_well_formed() {
        for _ in 0..50 {
            let token = generate_invite_token();
            assert!(is_well_formed_token(&token), "bad token {token}");
        }
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_invite_token(), generate_invite_token());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(!is_well_formed_token(""));
        assert!(!is_well_formed_token("ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
        assert!(!is_well_formed_token("abc"));
    }

    #[test]
    fn link_format() {
        assert_eq!(
            invite_link("https://app.example.com/", "abc123"),
            "https://app.example.com/#/Onboarding?invite=abc123"
        );
    }

    #[test]
    fn invite_input_validation() {
        assert!(validate_invite_input("Dana Ortiz", Some("(555) 010-2030")).is_ok());
        assert!(validate_invite_input("Dana Ortiz", None).is_ok());
        assert!(validate_invite_input("  ", None).is_err());
        assert!(validate_invite_input("Dana", Some("12")).is_err());
    }

    #[test]
    fn status_text() {
        assert_eq!(InviteStatus::Sent.as_str(), "sent");
        assert_eq!(
            "accepted".parse::<InviteStatus>().unwrap(),
            InviteStatus::Accepted
        );
    }
}

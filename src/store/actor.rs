//! Identity stamped on saved templates.

/// `user@host` for the current process, with `unknown` for missing parts.
pub fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_string_has_user_and_host() {
        let actor = actor_string();
        let (user, host) = actor.split_once('@').expect("user@host");
        assert!(!user.is_empty());
        assert!(!host.is_empty());
    }
}

//! Entry parameters carried by the URL the session was opened with.

use crate::model::profile::ProfileId;
use uuid::Uuid;

/// Parsed entry parameters.
///
/// - `shared_profile`: a profile to view regardless of current selection.
/// - `guest`: enter ephemeral no-auth mode.
/// - `prompt_create`: auto-open the creation form once, only when the
///   identity has zero profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryParams {
    pub shared_profile: Option<ProfileId>,
    pub guest: bool,
    pub prompt_create: bool,
}

impl EntryParams {
    /// Parses a URL-query-equivalent string (`profile=<uuid>&guest=1`).
    ///
    /// Unknown keys are ignored; a `profile` value that is not a UUID is
    /// ignored rather than rejected.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let trimmed = query.trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(trimmed.as_bytes()) {
            match key.as_ref() {
                "profile" => {
                    if let Ok(id) = Uuid::parse_str(value.as_ref()) {
                        params.shared_profile = Some(id);
                    }
                }
                "guest" => params.guest = value == "1",
                "create" => params.prompt_create = value == "1",
                _ => {}
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::EntryParams;
    use uuid::Uuid;

    #[test]
    fn parses_shared_profile_and_flags() {
        let id = Uuid::new_v4();
        let params = EntryParams::from_query(&format!("?profile={id}&create=1&other=x"));
        assert_eq!(params.shared_profile, Some(id));
        assert!(params.prompt_create);
        assert!(!params.guest);
    }

    #[test]
    fn ignores_malformed_profile_ids() {
        let params = EntryParams::from_query("profile=not-a-uuid&guest=1");
        assert_eq!(params.shared_profile, None);
        assert!(params.guest);
    }

    #[test]
    fn empty_query_yields_defaults() {
        assert_eq!(EntryParams::from_query(""), EntryParams::default());
    }
}

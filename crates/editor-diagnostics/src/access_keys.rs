//! Access keys for report actions.

use crate::report::Action;

/// Pick an access key for each action.
///
/// Each action gets the first ASCII letter of its name not already taken by an earlier action,
/// compared case-insensitively. The letter keeps the case it has in the name. Actions whose
/// letters are all taken get `None`.
pub fn assign_access_keys(actions: &[Action]) -> Vec<Option<char>> {
    let mut taken: Vec<char> = Vec::with_capacity(actions.len());
    let mut keys = Vec::with_capacity(actions.len());
    for action in actions {
        let key = action
            .name
            .chars()
            .find(|c| c.is_ascii_alphabetic() && !taken.iter().any(|t| t.eq_ignore_ascii_case(c)));
        if let Some(key) = key {
            taken.push(key);
        }
        keys.push(key);
    }
    keys
}

/// Index of the action bound to `key`, ignoring case.
pub fn action_for_key(keys: &[Option<char>], key: char) -> Option<usize> {
    keys.iter()
        .position(|k| k.is_some_and(|k| k.eq_ignore_ascii_case(&key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str) -> Action {
        Action::new(name, |_, _, _| {})
    }

    #[test]
    fn keys_skip_taken_letters_case_insensitively() {
        let actions = [action("Remove"), action("rename"), action("Reformat")];
        assert_eq!(
            assign_access_keys(&actions),
            vec![Some('R'), Some('e'), Some('f')]
        );
    }

    #[test]
    fn non_letters_are_never_keys() {
        let actions = [action("42!"), action("a"), action("A1")];
        assert_eq!(assign_access_keys(&actions), vec![None, Some('a'), None]);
    }

    #[test]
    fn lookup_ignores_case() {
        let keys = [Some('R'), None, Some('e')];
        assert_eq!(action_for_key(&keys, 'r'), Some(0));
        assert_eq!(action_for_key(&keys, 'E'), Some(2));
        assert_eq!(action_for_key(&keys, 'x'), None);
    }
}

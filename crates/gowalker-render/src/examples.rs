//! Attaching examples to the declarations they illustrate.

use gowalker_core::Example;

/// Claims the examples for declaration `name`, a method of `type_name`
/// when that is non-empty.
///
/// An example matches when its name starts with `Type_Name` (or `Name`)
/// and it is either exactly that name or that name plus a `_suffix`.
/// Claimed examples are marked used and never returned again, so callers
/// must visit methods before their type and the package itself last.
///
/// # Examples
///
/// ```
/// use gowalker_core::Example;
/// use gowalker_render::claim_examples;
///
/// let mut examples = vec![
///     Example { name: "Conn_Close".into(), ..Example::default() },
///     Example { name: "Conn".into(), ..Example::default() },
/// ];
///
/// let claimed = claim_examples(&mut examples, "Conn", "Close");
/// assert_eq!(claimed.len(), 1);
/// assert!(claim_examples(&mut examples, "Conn", "Close").is_empty());
/// assert_eq!(claim_examples(&mut examples, "", "Conn")[0].name, "Conn");
/// ```
pub fn claim_examples(examples: &mut [Example], type_name: &str, name: &str) -> Vec<Example> {
    let match_name = if type_name.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", type_name, name)
    };

    let mut claimed = Vec::new();
    for example in examples.iter_mut() {
        if example.used || !example.name.starts_with(&match_name) {
            continue;
        }
        match example.name.find('_') {
            None if example.name.len() != name.len() => continue,
            Some(index) if type_name.is_empty() && index > name.len() => continue,
            _ => {}
        }
        example.used = true;
        claimed.push(example.clone());
    }
    claimed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples(names: &[&str]) -> Vec<Example> {
        names
            .iter()
            .map(|name| Example {
                name: (*name).to_string(),
                ..Example::default()
            })
            .collect()
    }

    fn names(claimed: &[Example]) -> Vec<&str> {
        claimed.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_method_then_type() {
        let mut all = examples(&["Type_Method", "Type"]);
        assert_eq!(names(&claim_examples(&mut all, "Type", "Method")), vec!["Type_Method"]);
        assert!(claim_examples(&mut all, "Type", "Method").is_empty());
        assert_eq!(names(&claim_examples(&mut all, "", "Type")), vec!["Type"]);
    }

    #[test]
    fn test_suffixes() {
        let mut all = examples(&["Dial", "Dial_second", "DialTCP", "Dialer"]);
        assert_eq!(
            names(&claim_examples(&mut all, "", "Dial")),
            vec!["Dial", "Dial_second"]
        );
        assert_eq!(names(&claim_examples(&mut all, "", "DialTCP")), vec!["DialTCP"]);
    }

    #[test]
    fn test_package_examples() {
        let mut all = examples(&["", "_basic", "Conn_Close"]);
        assert_eq!(names(&claim_examples(&mut all, "", "")), vec!["", "_basic"]);
        assert!(!all[2].used);
    }
}

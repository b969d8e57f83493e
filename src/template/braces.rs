//! `{a|b|c}` random choice groups.

use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::Range;

/// Byte ranges of every innermost `{...}` group, left to right.
///
/// A group is innermost when its body holds no braces. Unmatched braces
/// never form a group.
pub fn innermost_groups(text: &str) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut open = None;

    for (i, c) in text.char_indices() {
        match c {
            '{' => open = Some(i),
            '}' => {
                if let Some(start) = open.take() {
                    groups.push(start..i + 1);
                }
            }
            _ => {}
        }
    }
    groups
}

/// Replace each brace group with one of its `|`-separated options.
///
/// Innermost groups are resolved first; the sweep repeats until no group is
/// left, so nested groups like `{a|{b|c}}` resolve fully.
pub fn resolve_braces<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut current = text.to_string();

    loop {
        let groups = innermost_groups(&current);
        if groups.is_empty() {
            return current;
        }

        let mut out = String::with_capacity(current.len());
        let mut last = 0;
        for group in groups {
            out.push_str(&current[last..group.start]);
            let options: Vec<&str> = current[group.start + 1..group.end - 1].split('|').collect();
            if let Some(choice) = options.choose(rng) {
                out.push_str(choice);
            }
            last = group.end;
        }
        out.push_str(&current[last..]);
        current = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_innermost_groups() {
        assert_eq!(innermost_groups("{a|b} {c|{d|e}}"), vec![0..5, 9..14]);
        assert!(innermost_groups("no groups } here {").is_empty());
    }

    #[test]
    fn test_choice_is_one_option() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let out = resolve_braces("a {red|green|blue} ball", &mut rng);
            assert!(
                ["a red ball", "a green ball", "a blue ball"].contains(&out.as_str()),
                "unexpected {out}"
            );
        }
    }

    #[test]
    fn test_nested_groups_resolve_fully() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve_braces("{x|{y|z}}", &mut rng);
        assert!(["x", "y", "z"].contains(&out.as_str()));
    }

    #[test]
    fn test_empty_options_are_allowed() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(resolve_braces("{}", &mut rng), "");
        let out = resolve_braces("a{|b}", &mut rng);
        assert!(out == "a" || out == "ab");
    }

    #[test]
    fn test_unbalanced_braces_stay() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(resolve_braces("{open only", &mut rng), "{open only");
        assert_eq!(resolve_braces("close} {a}", &mut rng), "close} a");
    }

    #[test]
    fn test_same_seed_same_choice() {
        let a = resolve_braces("{1|2|3|4|5|6|7|8}", &mut StdRng::seed_from_u64(99));
        let b = resolve_braces("{1|2|3|4|5|6|7|8}", &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}

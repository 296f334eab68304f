//! Password strength criteria.
//!
//! The sign-up page shows a live checklist under the password input. Each
//! entry is an independent predicate; the password is acceptable only when
//! every entry passes.

use serde::Serialize;

/// Minimum password length, in UTF-16 code units (the browser's
/// `String.length`).
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters accepted by the "special character" criterion.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// One atomic password-strength predicate.
#[derive(Clone, Copy)]
pub struct PasswordCriterion {
    /// Checklist text shown to the user.
    pub label: &'static str,
    /// Returns `true` when the password satisfies this criterion.
    pub test: fn(&str) -> bool,
}

impl PasswordCriterion {
    /// Run the predicate against `password`.
    #[must_use]
    pub fn check(&self, password: &str) -> CriterionStatus {
        CriterionStatus {
            label: self.label,
            met: (self.test)(password),
        }
    }
}

impl std::fmt::Debug for PasswordCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCriterion")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Live pass/fail state of one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionStatus {
    pub label: &'static str,
    pub met: bool,
}

fn long_enough(password: &str) -> bool {
    password.encode_utf16().count() >= MIN_PASSWORD_LENGTH
}

fn has_uppercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

fn has_special(password: &str) -> bool {
    password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

/// The fixed, ordered criteria list.
pub static PASSWORD_CRITERIA: [PasswordCriterion; 5] = [
    PasswordCriterion {
        label: "At least 8 characters",
        test: long_enough,
    },
    PasswordCriterion {
        label: "Contains uppercase letter",
        test: has_uppercase,
    },
    PasswordCriterion {
        label: "Contains lowercase letter",
        test: has_lowercase,
    },
    PasswordCriterion {
        label: "Contains number",
        test: has_digit,
    },
    PasswordCriterion {
        label: "Contains special character",
        test: has_special,
    },
];

/// Criteria the engine checks passwords against.
#[must_use]
pub fn criteria() -> &'static [PasswordCriterion] {
    &PASSWORD_CRITERIA
}

/// Evaluate every criterion, in checklist order.
#[must_use]
pub fn checklist(password: &str) -> Vec<CriterionStatus> {
    criteria().iter().map(|c| c.check(password)).collect()
}

/// Whether `password` satisfies every criterion.
#[must_use]
pub fn meets_all(password: &str) -> bool {
    criteria().iter().all(|c| (c.test)(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_meets_all() {
        assert!(meets_all("Abcdef1!"));
        assert!(checklist("Abcdef1!").iter().all(|s| s.met));
    }

    #[test]
    fn short_passwords_never_pass() {
        for candidate in ["", "A", "Ab1!", "Abcde1!", "Zz9$Zz9"] {
            assert!(!meets_all(candidate), "{candidate:?} should fail");
            assert!(!checklist(candidate)[0].met);
        }
    }

    #[test]
    fn each_criterion_is_independent() {
        let status = checklist("abcdefgh");
        assert_eq!(
            status.iter().map(|s| s.met).collect::<Vec<_>>(),
            vec![true, false, true, false, false]
        );

        let status = checklist("ABCDEFG1");
        assert_eq!(
            status.iter().map(|s| s.met).collect::<Vec<_>>(),
            vec![true, true, false, true, false]
        );
    }

    #[test]
    fn checklist_preserves_order_and_labels() {
        let labels: Vec<_> = checklist("").iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                "At least 8 characters",
                "Contains uppercase letter",
                "Contains lowercase letter",
                "Contains number",
                "Contains special character",
            ]
        );
    }

    #[test]
    fn only_listed_symbols_count_as_special() {
        assert!(!has_special("Abcdefg1-"));
        assert!(!has_special("Abcdefg1_"));
        assert!(has_special("Abcdefg1?"));
        assert!(has_special("Abcdefg1\""));
    }

    #[test]
    fn length_counts_utf16_code_units() {
        // Two-byte UTF-8, one code unit each.
        assert!(!long_enough("éééé"));
        assert!(long_enough("éééééééé"));

        // Astral-plane emoji take two code units each, as in the browser.
        let password = "Ab1!\u{1F600}\u{1F600}";
        assert_eq!(password.chars().count(), 6);
        assert!(long_enough(password));
        assert!(meets_all(password));
        assert!(!long_enough("Ab1!\u{1F600}"));
    }

    #[test]
    fn non_ascii_letters_do_not_satisfy_case_criteria() {
        assert!(!has_uppercase("ÉÀÜ"));
        assert!(!has_lowercase("éàü"));
    }
}

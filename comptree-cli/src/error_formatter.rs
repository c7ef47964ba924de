use comptree_core::Diagnostic;

#[derive(Debug, Default, Clone)]
pub(crate) struct Formatter {
    pub use_color: bool,
}

impl Formatter {
    pub fn format_error(&self, err: &crate::Error) -> String {
        let prefix = if self.use_color {
            color_print::cstr!("<red>error:</red> ")
        } else {
            "error: "
        };

        std::format!("{prefix}{err:#}\n")
    }

    pub fn format_warning(&self, diagnostic: &Diagnostic) -> String {
        let prefix = if self.use_color {
            color_print::cstr!("<yellow>warning:</yellow> ")
        } else {
            "warning: "
        };

        std::format!("{prefix}{diagnostic}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_error() {
        let formatter = Formatter { use_color: false };
        let err = crate::Error::NothingToComplete(String::from("mytool"));
        assert_eq!(
            formatter.format_error(&err),
            "error: nothing to complete in 'mytool'\n"
        );
    }

    #[test]
    fn colored_error() {
        let formatter = Formatter { use_color: true };
        let err = crate::Error::NothingToComplete(String::from("mytool"));
        assert!(formatter.format_error(&err).starts_with("\u{1b}["));
    }
}

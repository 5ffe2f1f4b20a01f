//! Shell command formatting for build actions.

use std::borrow::Cow;

use crate::conf::C_DOWNLOAD_PROGRAM;

/// `wget <source_url> -O <target_path>`, quoting arguments when needed.
pub fn format_download_command(source_url: &str, target_path: &str) -> String {
    format!(
        "{C_DOWNLOAD_PROGRAM} {} -O {}",
        quote_shell_arg(source_url),
        quote_shell_arg(target_path)
    )
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | '@' | '%' | '+' | ',')
}

/// Single-quote `value` unless every character is shell-safe.
fn quote_shell_arg(value: &str) -> Cow<'_, str> {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
}

#[cfg(test)]
mod tests {
    use super::{format_download_command, quote_shell_arg};

    #[test]
    fn plain_arguments_left_unquoted() {
        assert_eq!(
            format_download_command(
                "http://nodejs.org/dist/node-v0.2.6.tar.gz",
                "deps/node.tar.gz"
            ),
            "wget http://nodejs.org/dist/node-v0.2.6.tar.gz -O deps/node.tar.gz"
        );
    }

    #[test]
    fn metacharacters_are_quoted() {
        assert_eq!(
            format_download_command("http://host/get?a=1&b=2", "out dir/file"),
            "wget 'http://host/get?a=1&b=2' -O 'out dir/file'"
        );
        assert_eq!(quote_shell_arg("it's"), r"'it'\''s'");
        assert_eq!(quote_shell_arg(""), "''");
    }
}

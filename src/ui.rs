use colored::Colorize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print an added identifier
pub fn added(id: i64) {
    println!("  {} {}", "+".green().bold(), id.to_string().green());
}

/// Print a removed identifier
pub fn removed(id: i64) {
    println!("  {} {}", "-".red().bold(), id.to_string().red());
}

/// Mask a secret for display, keeping a short prefix
///
/// Secrets of 8 characters or fewer are fully hidden.
pub fn mask_secret(secret: &str) -> String {
    const VISIBLE: usize = 4;
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("xvz1evFS4wEEPTGEFPHBog"), "xvz1****");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("12345678"), "****");
        assert_eq!(mask_secret(""), "****");
    }

    #[test]
    fn test_mask_secret_multibyte() {
        assert_eq!(mask_secret("ééééééééé"), "éééé****");
    }
}

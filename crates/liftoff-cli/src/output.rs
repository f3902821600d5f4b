use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_kv(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<12} {value}");
}

pub fn mark(passed: bool) -> &'static str {
    if passed {
        "\u{2713}"
    } else {
        "\u{2717}"
    }
}

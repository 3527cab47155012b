/// Format a float as rupiah with thousands separators: Rp1,234,567.
/// Cents are shown only when the amount has them.
pub fn rupiah(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let body = if dec_part == "00" {
        with_commas
    } else {
        format!("{with_commas}.{dec_part}")
    };
    if negative && body != "0" {
        format!("-Rp{body}")
    } else {
        format!("Rp{body}")
    }
}

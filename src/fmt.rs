/// Plain amount with thousands separators and two decimals: 1,234.56.
/// Input files carry no currency, so none is shown.
pub fn amount(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    // Values that round to zero print unsigned.
    let negative = val < 0.0 && cents.bytes().any(|b| matches!(b, b'1'..=b'9'));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Bounded score shown as "whole / max". The fraction is truncated, not rounded.
pub fn score_out_of(score: f64, max: u32) -> String {
    format!("{} / {max}", score.trunc() as i64)
}

/// Unbounded score rounded to two places, trailing zeros dropped: 3.2, 0.57, 1
pub fn score_2dp(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    let s = format!("{rounded:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn ratio(val: f64) -> String {
    format!("{val:.3}")
}

/// Compact axis label: 950, 2.5k, 12k, 1.2M. Sign is kept.
pub fn compact_amount(val: f64) -> String {
    let abs = val.abs();
    let body = if abs >= 1_000_000.0 {
        let m = abs / 1_000_000.0;
        if m == m.floor() {
            format!("{}M", m as u64)
        } else {
            format!("{:.1}M", m)
        }
    } else if abs >= 1000.0 {
        let k = abs / 1000.0;
        if k == k.floor() {
            format!("{}k", k as u64)
        } else {
            format!("{:.1}k", k)
        }
    } else {
        format!("{}", abs.round() as u64)
    };
    if val < 0.0 && body != "0" {
        format!("-{body}")
    } else {
        body
    }
}

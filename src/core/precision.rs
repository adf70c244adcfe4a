/// Most quote decimals an instrument may configure.
pub const MAX_DECIMALS: u32 = 10;

/// Round half away from zero to `decimals` places, capped at [`MAX_DECIMALS`].
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (x * factor).round() / factor
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Render an optional level the way the desk quotes levels, `n/a` when absent.
pub fn fmt_level(level: Option<f64>) -> String {
    match level {
        Some(l) => format!("{:.4}", l),
        None => "n/a".to_string(),
    }
}

/// Render an optional pip distance, `inf` when the side has no level.
pub fn fmt_pips(pips: Option<f64>) -> String {
    match pips {
        Some(p) => format!("{:.1}", p),
        None => "inf".to_string(),
    }
}

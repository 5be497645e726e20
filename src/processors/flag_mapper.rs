use crate::models::QualityFlag;

/// ENVISTA status tokens and the flag each maps to.
///
/// Order matters: the substring fallback returns the first entry contained in
/// the input.
pub const ENVISTA_STATUS_TOKENS: [(&str, QualityFlag); 23] = [
    ("NoData", QualityFlag::NoData),
    ("InvId", QualityFlag::InvalidByOperator),
    ("Zero", QualityFlag::Calibration),
    ("Span", QualityFlag::Calibration),
    ("OutCal", QualityFlag::Calibration),
    ("Alarm", QualityFlag::EquipmentFailure),
    ("WarmUp", QualityFlag::EquipmentFailure),
    ("Maintain", QualityFlag::EquipmentFailure),
    ("Above R", QualityFlag::OutOfRange),
    ("Below R", QualityFlag::OutOfRange),
    ("Calm", QualityFlag::InvalidByOperator),
    ("<Samp", QualityFlag::InvalidByOperator),
    ("OffScan", QualityFlag::InvalidByOperator),
    ("NoData ", QualityFlag::NoData),
    ("OffScan ", QualityFlag::InvalidByOperator),
    ("Above_R", QualityFlag::OutOfRange),
    ("Below_R", QualityFlag::OutOfRange),
    ("", QualityFlag::NoData),
    (" ", QualityFlag::NoData),
    ("nan", QualityFlag::NoData),
    ("NaN", QualityFlag::NoData),
    ("NULL", QualityFlag::NoData),
    ("null", QualityFlag::NoData),
];

/// Map a raw instrument cell to a quality flag.
///
/// Returns `None` when the cell is a plain measurement. Lookup order: exact
/// token, case-insensitive substring in table order, numeric parse, and
/// finally `IO` for any other text.
pub fn map_status_token(raw: &str) -> Option<QualityFlag> {
    let token = raw.trim();

    if let Some((_, flag)) = ENVISTA_STATUS_TOKENS.iter().find(|(t, _)| *t == token) {
        return Some(*flag);
    }

    let lowered = token.to_lowercase();
    let substring_match = ENVISTA_STATUS_TOKENS
        .iter()
        .filter(|(t, _)| !t.is_empty())
        .find(|(t, _)| lowered.contains(&t.to_lowercase()));
    if let Some((_, flag)) = substring_match {
        return Some(*flag);
    }

    if token.parse::<f64>().is_ok() {
        return None;
    }

    Some(QualityFlag::InvalidByOperator)
}

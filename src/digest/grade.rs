use crate::models::GradeLabel;

/// Map a pollutant grade code to its severity label.
///
/// Total: any code outside "1".."4", including the empty string, is `Unknown`.
#[must_use]
pub fn grade(code: &str) -> GradeLabel {
    match code {
        "1" => GradeLabel::Good,
        "2" => GradeLabel::Moderate,
        "3" => GradeLabel::Unhealthy,
        "4" => GradeLabel::VeryUnhealthy,
        _ => GradeLabel::Unknown,
    }
}

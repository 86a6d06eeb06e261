use crate::catalog::ProgramType;

/// Lowercase ASCII slug: accents folded, every other run of non-alphanumeric
/// characters collapsed to a single `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars().flat_map(fold_accent) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(ch: char) -> Vec<char> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'æ' => return vec!['a', 'e'],
        'Æ' => return vec!['A', 'E'],
        'œ' => return vec!['o', 'e'],
        'Œ' => return vec!['O', 'E'],
        'ß' => return vec!['s', 's'],
        other => other,
    };
    vec![folded]
}

/// Program type implied by a scraper `master_type` label.
pub fn program_type_from(master_type: &str) -> ProgramType {
    let normalized = master_type.trim().to_lowercase();
    if normalized.contains("mba") && normalized.contains("executive") {
        ProgramType::Emba
    } else if normalized == "mba" {
        ProgramType::Mba
    } else if matches!(normalized.as_str(), "mim" | "master in management" | "pge") {
        ProgramType::Master
    } else if normalized.contains("finance") {
        ProgramType::Msc
    } else if normalized.contains("analytics") || normalized.contains("data") {
        ProgramType::SpecializedMsc
    } else if normalized.contains("msc") {
        ProgramType::Msc
    } else {
        ProgramType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_accents_and_collapses_separators() {
        assert_eq!(
            slugify("Financial Times - Masters en Management 2025 - mim"),
            "financial-times-masters-en-management-2025-mim"
        );
        assert_eq!(slugify("  École Supérieure  "), "ecole-superieure");
        assert_eq!(slugify("Cœur & Âme!"), "coeur-ame");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn master_type_maps_to_program_type() {
        assert_eq!(program_type_from("Executive MBA"), ProgramType::Emba);
        assert_eq!(program_type_from("MBA"), ProgramType::Mba);
        assert_eq!(program_type_from("MiM"), ProgramType::Master);
        assert_eq!(program_type_from("Masters in Finance"), ProgramType::Msc);
        assert_eq!(program_type_from("Business Analytics"), ProgramType::SpecializedMsc);
        assert_eq!(program_type_from("MSc Marketing"), ProgramType::Msc);
        assert_eq!(program_type_from("Bachelor"), ProgramType::Other);
    }
}

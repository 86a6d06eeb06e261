use crate::catalog::DeadlineType;

/// Coaching hint shown next to a task. The linked deadline type wins, then
/// keywords in the title, then a generic hint.
pub fn suggestion_for(title: &str, deadline_type: Option<DeadlineType>) -> &'static str {
    if let Some(kind) = deadline_type {
        return by_deadline_type(kind);
    }

    let lower = title.to_lowercase();
    if lower.contains("cv") {
        "Utilise un modèle concis, limite à 1 page et mets en avant tes preuves."
    } else if lower.contains("lettre") || lower.contains("motivation") {
        "Structure en 3 parties (accroche, preuves, projection) et reste < 1 page."
    } else if lower.contains("toefl") || lower.contains("ielts") {
        "Planifie des mocks chronométrés et révise les templates de réponses."
    } else {
        "Découpe la tâche en sous-étapes, assigne des dates et réserve des créneaux."
    }
}

fn by_deadline_type(kind: DeadlineType) -> &'static str {
    match kind {
        DeadlineType::Registration => {
            "Vérifie les pièces requises et fais relire ton dossier avant dépôt."
        }
        DeadlineType::Test => "Réserve ton créneau et planifie 2 sessions blanches cette semaine.",
        DeadlineType::Oral => {
            "Prépare un pitch 3 minutes et un Q&A, enregistre-toi pour t’entraîner."
        }
        DeadlineType::Result => {
            "Anticipe les démarches suivantes (inscription définitive, logement)."
        }
        DeadlineType::Other => "Découpe la tâche en sous-étapes avec une date cible réaliste.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_type_takes_precedence_over_keywords() {
        assert_eq!(
            suggestion_for("Envoyer le CV", Some(DeadlineType::Oral)),
            by_deadline_type(DeadlineType::Oral)
        );
    }

    #[test]
    fn keywords_pick_specific_hints() {
        assert!(suggestion_for("Mettre à jour mon CV", None).contains("1 page et mets"));
        assert!(suggestion_for("Lettre de motivation", None).contains("3 parties"));
        assert!(suggestion_for("Inscription TOEFL", None).contains("mocks"));
        assert!(suggestion_for("Appeler l'école", None).contains("sous-étapes"));
    }
}

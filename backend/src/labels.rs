use serde::Serialize;

/// Output classes of the plant model. Index `i` is the model's `i`th logit.
pub const PLANT_CLASS_NAMES: [&str; 30] = [
    "aloevera",
    "banana",
    "bilimbi",
    "cantaloupe",
    "cassava",
    "coconut",
    "corn",
    "cucumber",
    "curcuma",
    "eggplant",
    "galangal",
    "ginger",
    "guava",
    "kale",
    "longbeans",
    "mango",
    "melon",
    "orange",
    "paddy",
    "papaya",
    "peper chili",
    "pineapple",
    "pomelo",
    "shallot",
    "soybeans",
    "spinach",
    "sweet potatoes",
    "tobacco",
    "waterapple",
    "watermelon",
];

pub fn plant_label(index: usize) -> Option<&'static str> {
    PLANT_CLASS_NAMES.get(index).copied()
}

/// Index of the highest score. Ties go to the lowest index, NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Toxicity {
    Toxic,
    NonToxic,
}

impl Toxicity {
    pub const TOXIC_CLASS: usize = 1;

    pub fn from_class(index: usize) -> Self {
        if index == Self::TOXIC_CLASS {
            Toxicity::Toxic
        } else {
            Toxicity::NonToxic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_table_keeps_model_order() {
        assert_eq!(PLANT_CLASS_NAMES.len(), 30);
        assert_eq!(plant_label(0), Some("aloevera"));
        assert_eq!(plant_label(20), Some("peper chili"));
        assert_eq!(plant_label(29), Some("watermelon"));
        assert_eq!(plant_label(30), None);
    }

    #[test]
    fn argmax_prefers_first_of_equal_scores() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some(0));
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), Some(1));
    }

    #[test]
    fn argmax_handles_degenerate_input() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
        assert_eq!(argmax(&[f32::NAN, -3.0]), Some(1));
        assert_eq!(argmax(&[-5.0, -1.0]), Some(1));
    }

    #[test]
    fn only_class_one_is_toxic() {
        assert_eq!(Toxicity::from_class(1), Toxicity::Toxic);
        assert_eq!(Toxicity::from_class(0), Toxicity::NonToxic);
        assert_eq!(Toxicity::from_class(7), Toxicity::NonToxic);
    }

    #[test]
    fn toxicity_serializes_as_upper_snake() {
        assert_eq!(serde_json::to_string(&Toxicity::Toxic).unwrap(), "\"TOXIC\"");
        assert_eq!(serde_json::to_string(&Toxicity::NonToxic).unwrap(), "\"NON_TOXIC\"");
    }
}

/// Visual Telephone — Static Classroom Content
///
/// Starting themes for round 1 and the prompt recipe shown to every group.

use crate::domain::Participant;

/// Theme handed to a group when it starts its own chain.
pub fn initiator_theme(group: Participant) -> Option<&'static str> {
    match group {
        Participant::Group1 => Some(
            "What would your classroom look like if it became a magical world on the last day?",
        ),
        Participant::Group2 => Some(
            "Create a scene where everything goes hilariously wrong on the last day of class.",
        ),
        Participant::Group3 => {
            Some("How would the last day of class look in a school of the distant future?")
        }
        Participant::Group4 => Some(
            "Illustrate the abstract concept of 'finishing something important' as a visual story.",
        ),
        Participant::Group5 => Some(
            "Show the bittersweet feeling of walking out of the classroom for the very last time.",
        ),
        Participant::Teacher => None,
    }
}

/// One ingredient of the four-part prompt formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

/// Subject + Style + Material + Vibe.
pub const PROMPT_RECIPE: [RecipeCategory; 4] = [
    RecipeCategory {
        name: "The Subject",
        description: "What is it?",
        examples: &[
            "A chair",
            "A futuristic sneaker",
            "A perfume bottle",
            "A bus stop",
            "A tiny house",
            "A geometric explosion",
            "Letter 'A'",
        ],
    },
    RecipeCategory {
        name: "The Style",
        description: "History & Movement",
        examples: &[
            "Art Deco",
            "Bauhaus",
            "Art Nouveau",
            "Cyberpunk",
            "Minimalist",
            "Memphis Design",
            "In the style of Wes Anderson",
        ],
    },
    RecipeCategory {
        name: "The Material",
        description: "What is it made of?",
        examples: &[
            "Polished chrome",
            "Raw concrete",
            "Rusted iron",
            "Blue velvet",
            "Fluffy cotton candy",
            "Translucent plastic",
            "Glowing neon tubing",
        ],
    },
    RecipeCategory {
        name: "The Vibe",
        description: "Camera & Lighting",
        examples: &[
            "Cinematic lighting",
            "Golden hour",
            "Neon noir",
            "Studio softbox",
            "Isometric view",
            "Macro close-up",
            "Fish-eye lens",
        ],
    },
];

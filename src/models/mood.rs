use serde::Serialize;

/// A selectable mood. `score` runs from 1 (worst) to 10 (best) and is what
/// the analytics averages are computed over.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Mood {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub score: i32,
    pub prompt: &'static str,
    pub image_query: &'static str,
}

pub const MOODS: &[Mood] = &[
    Mood {
        id: "happy",
        label: "Happy",
        emoji: "😊",
        score: 8,
        prompt: "What's making you smile today?",
        image_query: "happy joy",
    },
    Mood {
        id: "excited",
        label: "Excited",
        emoji: "🤩",
        score: 9,
        prompt: "What are you looking forward to?",
        image_query: "celebration excited",
    },
    Mood {
        id: "grateful",
        label: "Grateful",
        emoji: "🙏",
        score: 9,
        prompt: "What are you grateful for today?",
        image_query: "gratitude thankful",
    },
    Mood {
        id: "peaceful",
        label: "Peaceful",
        emoji: "😌",
        score: 8,
        prompt: "What brings you peace right now?",
        image_query: "peaceful nature",
    },
    Mood {
        id: "hopeful",
        label: "Hopeful",
        emoji: "🌱",
        score: 7,
        prompt: "What gives you hope?",
        image_query: "sunrise hope",
    },
    Mood {
        id: "content",
        label: "Content",
        emoji: "🙂",
        score: 7,
        prompt: "What feels right in your life?",
        image_query: "calm content",
    },
    Mood {
        id: "neutral",
        label: "Neutral",
        emoji: "😐",
        score: 5,
        prompt: "How was your day?",
        image_query: "calm landscape",
    },
    Mood {
        id: "tired",
        label: "Tired",
        emoji: "😴",
        score: 4,
        prompt: "What's draining your energy?",
        image_query: "rest sleep",
    },
    Mood {
        id: "anxious",
        label: "Anxious",
        emoji: "😰",
        score: 3,
        prompt: "What's on your mind?",
        image_query: "stormy sky",
    },
    Mood {
        id: "sad",
        label: "Sad",
        emoji: "😢",
        score: 2,
        prompt: "What's weighing on your heart?",
        image_query: "rain window",
    },
    Mood {
        id: "frustrated",
        label: "Frustrated",
        emoji: "😤",
        score: 2,
        prompt: "What's blocking your progress?",
        image_query: "tangled knot",
    },
    Mood {
        id: "angry",
        label: "Angry",
        emoji: "😠",
        score: 1,
        prompt: "What's causing your frustration?",
        image_query: "storm fire",
    },
];

/// Case-insensitive lookup by mood id.
pub fn mood_by_id(id: &str) -> Option<&'static Mood> {
    MOODS.iter().find(|m| m.id.eq_ignore_ascii_case(id.trim()))
}

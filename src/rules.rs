use crate::suggest::SuggestionRule;

/// Static knowledge-base of outing tips, evaluated in order. Trigger
/// tags use the survey's answer wording; matching is case-insensitive.
pub const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        trigger_tags: &["Finding clean baby rooms"],
        tip: "Look up parent-rated baby rooms before you leave; larger malls \
              and libraries usually keep theirs cleanest early in the day.",
    },
    SuggestionRule {
        trigger_tags: &["Lack of breastfeeding areas"],
        tip: "Cafés and libraries with a breastfeeding-friendly sticker will \
              seat you without asking; it is worth keeping a list of two or \
              three near your usual routes.",
    },
    SuggestionRule {
        trigger_tags: &["Crowded or noisy spaces", "Quiet times to visit"],
        tip: "Mid-morning on weekdays is usually the quietest window for \
              malls, pools and playgrounds.",
    },
    SuggestionRule {
        trigger_tags: &["No parking or difficult access"],
        tip: "Check for pram-accessible entrances and parent parking on the \
              venue's website before committing to a trip.",
    },
    SuggestionRule {
        trigger_tags: &["Judgement from others"],
        tip: "Parent-and-baby sessions exist exactly so nobody is watching \
              the clock or the noise; most pools, cinemas and cafés run \
              them weekly.",
    },
    SuggestionRule {
        trigger_tags: &["Anxious", "Overwhelmed"],
        tip: "Keep the first outing short and close to home, and plan one \
              fallback spot where you can feed or settle your baby.",
    },
    SuggestionRule {
        trigger_tags: &["Stressed"],
        tip: "A packing checklist on your phone removes the last-minute \
              scramble that makes leaving the house stressful.",
    },
    SuggestionRule {
        trigger_tags: &["Isolated", "Lonely"],
        tip: "Local parent groups often meet at the same café each week; \
              one regular outing with company beats three alone.",
    },
    SuggestionRule {
        trigger_tags: &["Locations of baby facilities"],
        tip: "Community maps of changing tables and feeding rooms are kept \
              up to date by other parents; check one before trying a new \
              suburb.",
    },
    SuggestionRule {
        trigger_tags: &["Parent reviews and ratings"],
        tip: "Recent parent reviews are a better guide than star ratings; \
              sort by newest when choosing a venue.",
    },
    SuggestionRule {
        trigger_tags: &["Quiet times to visit", "Crowded or noisy spaces"],
        tip: "Ask staff when their quietest hours are; most venues will \
              tell you exactly which mornings to pick.",
    },
    SuggestionRule {
        trigger_tags: &["Breastfeeding-friendly venues"],
        tip: "Plunket rooms and council libraries are reliable \
              breastfeeding stops in most town centres.",
    },
];

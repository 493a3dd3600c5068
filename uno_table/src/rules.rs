use crate::card::{is_wild, Card, CardColor};

/// Local guess at whether `card` may go on `top`.
///
/// Used to dim cards and to ignore clicks on them. The game service still
/// judges every submitted play and may disagree.
pub fn can_play_on(top: Option<&Card>, card: Option<&Card>, current_color: Option<CardColor>) -> bool {
    let Some(card) = card else {
        return false;
    };
    if is_wild(card) {
        return true;
    }

    let color_to_match = current_color.or_else(|| top.and_then(|t| t.color));
    if let (Some(own), Some(wanted)) = (card.color, color_to_match) {
        if own == wanted {
            return true;
        }
    }

    matches!(
        (top.and_then(|t| t.value.as_deref()), card.value.as_deref()),
        (Some(a), Some(b)) if a == b
    )
}

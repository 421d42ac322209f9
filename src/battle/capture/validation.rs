use crate::combatant::ActiveCombatant;
use crate::errors::CaptureError;
use crate::session::GameState;

/// Check capture preconditions and return the creature that would be captured.
pub fn can_attempt_capture(state: &GameState) -> Result<&ActiveCombatant, CaptureError> {
    if state.items == 0 {
        return Err(CaptureError::NoItems);
    }
    state.last_defeated.as_ref().ok_or(CaptureError::NoTarget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::creature;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_requires_items_and_target() {
        let target = ActiveCombatant::new(creature(19, "rattata", 30), 6, vec![]);

        let no_items = GameState {
            items: 0,
            last_defeated: Some(target.clone()),
            ..Default::default()
        };
        assert_eq!(can_attempt_capture(&no_items), Err(CaptureError::NoItems));

        let no_target = GameState::default();
        assert_eq!(can_attempt_capture(&no_target), Err(CaptureError::NoTarget));

        let ready = GameState {
            items: 1,
            last_defeated: Some(target.clone()),
            ..Default::default()
        };
        assert_eq!(can_attempt_capture(&ready), Ok(&target));
    }
}

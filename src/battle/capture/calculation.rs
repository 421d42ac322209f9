use std::collections::BTreeSet;

use log::{debug, warn};
use schema::CatalogKey;

use crate::catalog::Catalog;
use crate::combatant::ActiveCombatant;
use crate::errors::CaptureError;
use crate::progression::ProgressionEngine;

/// Result of a capture: the new active combatant plus the updated inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub captured_combatant: ActiveCombatant,
    pub items: u32,
    pub captured: BTreeSet<u32>,
}

/// Capture always succeeds when an item is available. The new combatant is
/// built fresh at the defeated creature's battle level.
pub async fn capture(
    catalog: &dyn Catalog,
    last_defeated: &ActiveCombatant,
    items: u32,
    captured: &BTreeSet<u32>,
) -> Result<CaptureOutcome, CaptureError> {
    if items == 0 {
        return Err(CaptureError::NoItems);
    }

    // The opponent snapshot only carries its trimmed battle move list
    let record = match catalog
        .get_creature(&CatalogKey::Id(last_defeated.id()))
        .await
    {
        Ok(full) => full,
        Err(err) => {
            warn!(
                "Using battle snapshot for captured {}: {}",
                last_defeated.name(),
                err
            );
            last_defeated.record.clone()
        }
    };

    let engine = ProgressionEngine::new(catalog);
    let learned_moves = engine.learned_moves(&record, last_defeated.level).await;
    let captured_combatant = ActiveCombatant::new(record, last_defeated.level, learned_moves);

    let mut captured = captured.clone();
    captured.insert(captured_combatant.id());
    debug!(
        "Captured {} at level {}",
        captured_combatant.name(),
        captured_combatant.level
    );

    Ok(CaptureOutcome {
        captured_combatant,
        items: items - 1,
        captured,
    })
}

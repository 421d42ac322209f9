use super::ProgressionEngine;
use crate::combatant::ActiveCombatant;
use crate::errors::CatalogResult;
use log::{debug, warn};
use schema::{CatalogKey, ChainLink, CreatureRecord};

impl ProgressionEngine<'_> {
    /// The next evolution stage if the combatant's level already qualifies.
    /// Lookup failures are logged and treated as "no evolution".
    pub async fn find_evolution(&self, combatant: &ActiveCombatant) -> Option<CreatureRecord> {
        match self.lookup_evolution(combatant).await {
            Ok(found) => found,
            Err(err) => {
                warn!("Evolution check for {} failed: {}", combatant.name(), err);
                None
            }
        }
    }

    async fn lookup_evolution(
        &self,
        combatant: &ActiveCombatant,
    ) -> CatalogResult<Option<CreatureRecord>> {
        let species = self
            .catalog
            .get_species(&combatant.record.species_key())
            .await?;
        let Some(chain_id) = species.evolution_chain_id else {
            return Ok(None);
        };
        let chain = self.catalog.get_evolution_chain(chain_id).await?;

        let Some(next) = chain
            .chain
            .find(combatant.name())
            .and_then(ChainLink::next_stage)
        else {
            return Ok(None);
        };

        // Stages gated by items or trades carry no min level and never qualify
        match next.min_level {
            Some(min_level) if min_level > 0 && combatant.level >= min_level => {
                debug!(
                    "{} qualifies for {} (min level {})",
                    combatant.name(),
                    next.species.name,
                    min_level
                );
                let record = self
                    .catalog
                    .get_creature(&CatalogKey::Name(next.species.name.clone()))
                    .await?;
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }

    /// Rebuild the combatant as `evolved` at the same level, keeping its
    /// experience and current HP (clamped to the new max).
    pub async fn evolve(
        &self,
        combatant: &ActiveCombatant,
        evolved: CreatureRecord,
    ) -> ActiveCombatant {
        let learned_moves = self.learned_moves(&evolved, combatant.level).await;
        let mut next = ActiveCombatant::new(evolved, combatant.level, learned_moves);
        next.current_hp = combatant.current_hp.min(next.max_hp);
        next.experience = combatant.experience;
        next
    }
}

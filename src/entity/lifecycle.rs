//! Entity lifecycle - the per-step decision protocol
//!
//! Each step an entity runs, in order:
//! severance check -> reproduction -> environment interaction -> cost payment
//!
//! Children are held by id. A parent owns the relationship, not the child:
//! severing drops the id from the child list while the child keeps living in
//! the population.

use rand::Rng;

use crate::core::config::{FounderSpec, SimulationConfig};
use crate::core::types::{EntityId, IdAllocator, Tick};
use crate::entity::decisions::{Decision, DecisionLog, SeveranceReason};
use crate::entity::life::LifeKernel;
use crate::entity::preference::PreferenceCore;
use crate::environment::Environment;

/// Read access to other entities, used to inspect children during a step
pub trait KinView {
    fn kin(&self, id: EntityId) -> Option<&Entity>;
}

/// Per-step inputs shared by every entity in a tick
pub struct StepContext<'a> {
    pub config: &'a SimulationConfig,
    pub ids: &'a mut IdAllocator,
    pub tick: Tick,
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    label: String,
    generation: u32,
    /// Recorded for lineage reports only, never used to reach the parent
    parent: Option<EntityId>,
    born_at: Tick,
    died_at: Option<Tick>,
    life: LifeKernel,
    preferences: PreferenceCore,
    children: Vec<EntityId>,
    log: DecisionLog,
    attachment: f64,
    panic_threshold: f64,
}

impl Entity {
    /// Assemble an entity from parts; attachment and panic threshold are
    /// derived here and never recomputed.
    pub fn from_parts(
        id: EntityId,
        label: impl Into<String>,
        generation: u32,
        life: LifeKernel,
        preferences: PreferenceCore,
        config: &SimulationConfig,
    ) -> Self {
        let attachment = preferences.attachment();
        Self {
            id,
            label: label.into(),
            generation,
            parent: None,
            born_at: 0,
            died_at: None,
            life,
            preferences,
            children: Vec::new(),
            log: DecisionLog::new(),
            attachment,
            panic_threshold: config.panic_threshold(attachment),
        }
    }

    /// Generation-0 entity with random genesis traits and forced attachment
    pub fn founder<R: Rng + ?Sized>(
        id: EntityId,
        spec: &FounderSpec,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let mut preferences = PreferenceCore::genesis(config, rng);
        preferences.override_attachment(spec.attachment);
        Self::from_parts(
            id,
            spec.name.clone(),
            0,
            LifeKernel::from_config(config),
            preferences,
            config,
        )
    }

    /// Child of `parent`: inherited traits, fresh life, `G{gen}_{nnnn}` label
    pub fn offspring<R: Rng + ?Sized>(
        id: EntityId,
        parent: &Entity,
        tick: Tick,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let preferences =
            PreferenceCore::inherit(&parent.preferences, config.mutation_rate, config, rng);
        let generation = parent.generation + 1;
        let label = format!("G{}_{}", generation, rng.gen_range(1000..=9999));

        let mut child = Self::from_parts(
            id,
            label,
            generation,
            LifeKernel::from_config(config),
            preferences,
            config,
        );
        child.parent = Some(parent.id);
        child.born_at = tick;
        child
    }

    // === ACCESSORS ===

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn born_at(&self) -> Tick {
        self.born_at
    }

    /// Tick of the step in which this entity died
    pub fn died_at(&self) -> Option<Tick> {
        self.died_at
    }

    pub fn life(&self) -> &LifeKernel {
        &self.life
    }

    pub fn resource(&self) -> f64 {
        self.life.resource()
    }

    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    pub fn preferences(&self) -> &PreferenceCore {
        &self.preferences
    }

    pub fn attachment(&self) -> f64 {
        self.attachment
    }

    pub fn panic_threshold(&self) -> f64 {
        self.panic_threshold
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn log(&self) -> &DecisionLog {
        &self.log
    }

    /// Take ownership of an existing entity's relationship
    pub(crate) fn adopt(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    // === STEP PROTOCOL ===

    /// Advance one tick. Returns the newborn, if this entity reproduced.
    pub fn step<K, E, R>(
        &mut self,
        kin: &K,
        environment: &mut E,
        ctx: &mut StepContext<'_>,
        rng: &mut R,
    ) -> Option<Entity>
    where
        K: KinView + ?Sized,
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.is_alive() {
            return None;
        }
        let config = ctx.config;

        // 1. Hold on or let go
        self.check_severance(kin, config, ctx.tick);

        // 2. Reproduce
        let child = self.reproduce(ctx, rng);

        // 3. Best achievable pleasure from this tick's structures
        let best_score = environment
            .generate_structures(rng)
            .iter()
            .map(|s| self.preferences.affinity(s))
            .reduce(f64::max)
            .unwrap_or(0.0);

        // 4. Base metabolism + mismatch penalty + entanglement tax.
        // Affinity above 1 turns the penalty into a refund; the cost is not floored.
        let total_cost = config.base_metabolism
            + (1.0 - best_score) * config.mismatch_scale
            + self.children.len() as f64 * config.entanglement_tax;
        self.life.consume(total_cost);

        self.note_death(ctx.tick);
        child
    }

    /// Why a parent in this state would sever a child at `child_resource`
    ///
    /// Rules in priority order: martyr never severs, then panic, then release.
    pub fn severance_reason(
        &self,
        child_resource: f64,
        config: &SimulationConfig,
    ) -> Option<SeveranceReason> {
        if self.attachment > config.martyr_attachment {
            None
        } else if self.life.resource() < self.panic_threshold {
            Some(SeveranceReason::Panic)
        } else if child_resource > config.release_threshold(self.attachment) {
            Some(SeveranceReason::Release)
        } else {
            None
        }
    }

    /// Drop dead children, then sever living ones that meet a rule
    ///
    /// Pain is paid per severance against the current resource, so earlier
    /// children in the list can leave the parent too weak to release later
    /// ones. A severance whose pain would take resource to 0 or below is
    /// abandoned and the child kept.
    pub fn check_severance<K: KinView + ?Sized>(
        &mut self,
        kin: &K,
        config: &SimulationConfig,
        tick: Tick,
    ) {
        if self.children.is_empty() {
            return;
        }

        let mut kept = Vec::with_capacity(self.children.len());
        for child_id in std::mem::take(&mut self.children) {
            let Some(child) = kin.kin(child_id) else {
                continue;
            };
            if !child.is_alive() {
                continue;
            }

            let Some(reason) = self.severance_reason(child.resource(), config) else {
                kept.push(child_id);
                continue;
            };

            let pain = config.severance_pain(self.attachment);
            if self.life.resource() - pain <= 0.0 {
                tracing::debug!(
                    entity = %self.label,
                    child = %child.label(),
                    resource = self.life.resource(),
                    pain,
                    "too weak to sever, holding on"
                );
                kept.push(child_id);
                continue;
            }

            self.life.consume(pain);
            tracing::debug!(
                entity = %self.label,
                child = %child.label(),
                %reason,
                pain,
                "severed child"
            );
            self.log.record(Decision::Severed {
                tick,
                reason,
                child: child_id,
                child_label: child.label().to_string(),
                pain,
            });
        }
        self.children = kept;
        self.note_death(tick);
    }

    /// Possibly spend a share of resource on one child
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        ctx: &mut StepContext<'_>,
        rng: &mut R,
    ) -> Option<Entity> {
        let config = ctx.config;
        if self.life.resource() <= config.reproduction_threshold {
            return None;
        }
        let roll: f64 = rng.gen();
        if roll >= config.reproduction_probability {
            return None;
        }

        let cost = self.life.resource() * config.reproduction_cost_fraction;
        self.life.consume(cost);

        let child = Entity::offspring(ctx.ids.allocate(), self, ctx.tick, config, rng);
        self.children.push(child.id);
        self.log.record(Decision::Reproduced {
            tick: ctx.tick,
            child: child.id,
            child_label: child.label.clone(),
            resource_after: self.life.resource(),
        });
        tracing::debug!(
            entity = %self.label,
            child = %child.label,
            resource = self.life.resource(),
            "reproduced"
        );

        Some(child)
    }

    fn note_death(&mut self, tick: Tick) {
        if self.died_at.is_none() && !self.life.is_alive() {
            self.died_at = Some(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::preference::TraitWeights;
    use crate::environment::{FixedEnvironment, Structure};
    use ahash::AHashMap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Kin(AHashMap<EntityId, Entity>);

    impl KinView for Kin {
        fn kin(&self, id: EntityId) -> Option<&Entity> {
            self.0.get(&id)
        }
    }

    fn kin(entities: Vec<Entity>) -> Kin {
        Kin(entities.into_iter().map(|e| (e.id(), e)).collect())
    }

    fn entity(id: u64, attachment: f64, resource: f64, config: &SimulationConfig) -> Entity {
        let weights = TraitWeights {
            symmetry: 0.5,
            compression: 0.5,
            rhythm: 0.5,
            novelty: 0.5,
            attachment,
        };
        Entity::from_parts(
            EntityId(id),
            format!("E{}", id),
            0,
            LifeKernel::new(resource, config.death_epsilon),
            PreferenceCore::from_weights(weights),
            config,
        )
    }

    /// Reproduction never triggers: every roll fails the threshold check
    fn no_repro_config() -> SimulationConfig {
        SimulationConfig {
            reproduction_probability: 0.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_founder_thresholds() {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let adam = Entity::founder(EntityId(0), &FounderSpec::new("Adam", 0.05), &config, &mut rng);
        let eve = Entity::founder(EntityId(1), &FounderSpec::new("Eve", 0.98), &config, &mut rng);

        assert_eq!(adam.label(), "Adam");
        assert_eq!(adam.generation(), 0);
        assert!((adam.panic_threshold() - 0.475).abs() < 1e-9);
        assert!((eve.panic_threshold() - 0.01).abs() < 1e-9);
        assert_eq!(eve.attachment(), 0.98);
        assert_eq!(adam.resource(), 1.0);
    }

    #[test]
    fn test_offspring_inherits_and_starts_fresh() {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let parent = entity(0, 0.5, 0.3, &config);
        let child = Entity::offspring(EntityId(1), &parent, 7, &config, &mut rng);

        assert_eq!(child.generation(), 1);
        assert_eq!(child.parent(), Some(EntityId(0)));
        assert_eq!(child.born_at(), 7);
        assert_eq!(child.resource(), 1.0);
        assert!(child.label().starts_with("G1_"));
        assert!((child.attachment() - 0.5).abs() <= 0.1 + 1e-12);
        assert!((child.panic_threshold() - 0.5 * (1.0 - child.attachment())).abs() < 1e-12);
    }

    #[test]
    fn test_martyr_never_severs() {
        let config = no_repro_config();
        let mut parent = entity(0, 0.98, 0.05, &config);
        let strong = entity(1, 0.5, 1.0, &config);
        let view = kin(vec![strong]);
        parent.adopt(EntityId(1));

        for tick in 0..5 {
            parent.check_severance(&view, &config, tick);
        }
        assert_eq!(parent.children(), &[EntityId(1)]);
        assert!(parent.log().is_empty());
        assert!((parent.resource() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_panic_severance_pays_pain() {
        let config = no_repro_config();
        // threshold 0.5 * (1 - 0.2) = 0.4
        let mut parent = entity(0, 0.2, 0.3, &config);
        let view = kin(vec![entity(1, 0.5, 0.5, &config)]);
        parent.adopt(EntityId(1));

        parent.check_severance(&view, &config, 4);

        assert!(parent.children().is_empty());
        let pain = 0.05 * 1.2;
        assert!((parent.resource() - (0.3 - pain)).abs() < 1e-12);
        let entry = parent.log().iter().next().unwrap();
        assert!(matches!(
            entry,
            Decision::Severed { reason: SeveranceReason::Panic, tick: 4, .. }
        ));
    }

    #[test]
    fn test_release_needs_strong_child() {
        let config = no_repro_config();
        // release threshold 0.8 + 0.4 * 0.15 = 0.86
        let mut parent = entity(0, 0.4, 0.9, &config);
        let weak = entity(1, 0.5, 0.85, &config);
        let strong = entity(2, 0.5, 0.87, &config);
        let view = kin(vec![weak, strong]);
        parent.adopt(EntityId(1));
        parent.adopt(EntityId(2));

        parent.check_severance(&view, &config, 0);

        assert_eq!(parent.children(), &[EntityId(1)]);
        assert_eq!(parent.log().severances().count(), 1);
        assert!(parent.log().lines()[0].starts_with("[SEVER] Release (E2)"));
    }

    #[test]
    fn test_hesitation_trap_keeps_child() {
        let config = no_repro_config();
        let pain = config.severance_pain(0.5);
        let mut parent = entity(0, 0.5, pain, &config);
        let view = kin(vec![entity(1, 0.5, 0.5, &config)]);
        parent.adopt(EntityId(1));

        assert_eq!(
            parent.severance_reason(0.5, &config),
            Some(SeveranceReason::Panic)
        );
        parent.check_severance(&view, &config, 0);

        assert_eq!(parent.children(), &[EntityId(1)]);
        assert_eq!(parent.resource(), pain);
        assert!(parent.log().is_empty());
    }

    #[test]
    fn test_sequential_pain_triggers_trap() {
        let config = no_repro_config();
        let pain = config.severance_pain(0.0);
        // Enough for one severance but not two
        let resource = pain * 1.5;
        let mut parent = entity(0, 0.0, resource, &config);
        let view = kin(vec![entity(1, 0.5, 0.5, &config), entity(2, 0.5, 0.5, &config)]);
        parent.adopt(EntityId(1));
        parent.adopt(EntityId(2));

        parent.check_severance(&view, &config, 0);

        assert_eq!(parent.children(), &[EntityId(2)]);
        assert_eq!(parent.log().len(), 1);
        assert!((parent.resource() - (resource - pain)).abs() < 1e-12);
    }

    #[test]
    fn test_dead_children_dropped_free() {
        let config = no_repro_config();
        let mut parent = entity(0, 0.98, 0.5, &config);
        let dead = entity(1, 0.5, 0.0, &config);
        assert!(!dead.is_alive());
        let view = kin(vec![dead]);
        parent.adopt(EntityId(1));
        parent.adopt(EntityId(2)); // unknown to the view

        parent.check_severance(&view, &config, 0);

        assert!(parent.children().is_empty());
        assert_eq!(parent.resource(), 0.5);
    }

    #[test]
    fn test_reproduction_cost_is_exact() {
        let config = SimulationConfig {
            reproduction_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ids = IdAllocator::new();
        ids.allocate();
        let mut parent = entity(0, 0.5, 0.9, &config);
        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 12,
        };

        let child = parent.reproduce(&mut ctx, &mut rng).expect("should reproduce");

        assert_eq!(parent.resource(), 0.9 - 0.9 * 0.4);
        assert_eq!(child.resource(), 1.0);
        assert_eq!(child.id(), EntityId(1));
        assert_eq!(parent.children(), &[EntityId(1)]);
        assert_eq!(parent.log().reproductions().count(), 1);
    }

    #[test]
    fn test_no_reproduction_at_threshold() {
        let config = SimulationConfig {
            reproduction_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ids = IdAllocator::new();
        let mut parent = entity(0, 0.5, 0.6, &config);
        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 0,
        };
        assert!(parent.reproduce(&mut ctx, &mut rng).is_none());
        assert_eq!(parent.resource(), 0.6);
    }

    #[test]
    fn test_step_cost_accounting() {
        let config = no_repro_config();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ids = IdAllocator::new();
        let mut env = FixedEnvironment::constant(vec![
            Structure::uniform(0.2),
            Structure::uniform(0.4),
        ])
        .unwrap();
        // Martyr keeps its one child, so the tax applies
        let mut parent = entity(0, 0.98, 0.5, &config);
        let view = kin(vec![entity(1, 0.5, 1.0, &config)]);
        parent.adopt(EntityId(1));

        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 0,
        };
        let newborn = parent.step(&view, &mut env, &mut ctx, &mut rng);

        assert!(newborn.is_none());
        // best affinity = 4 * 0.5 * 0.4 = 0.8
        let expected = 0.5 - (0.01 + (1.0 - 0.8) * 0.02 + 0.005);
        assert!((parent.resource() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rich_batch_refunds_resource() {
        let config = no_repro_config();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ids = IdAllocator::new();
        let mut env = FixedEnvironment::constant(vec![Structure::uniform(1.0)]).unwrap();
        let weights = TraitWeights {
            symmetry: 0.9,
            compression: 0.9,
            rhythm: 0.9,
            novelty: 0.9,
            attachment: 0.5,
        };
        let mut gourmet = Entity::from_parts(
            EntityId(0),
            "Gourmet".to_string(),
            0,
            LifeKernel::from_config(&config),
            PreferenceCore::from_weights(weights),
            &config,
        );
        let view = kin(vec![]);
        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 0,
        };

        gourmet.step(&view, &mut env, &mut ctx, &mut rng);

        // best affinity = 3.6, cost = 0.01 + (1 - 3.6) * 0.02 = -0.042
        assert!(gourmet.resource() > config.start_resource);
        assert!((gourmet.resource() - 1.042).abs() < 1e-12);
    }

    #[test]
    fn test_dead_entity_step_is_noop() {
        let config = SimulationConfig {
            reproduction_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ids = IdAllocator::new();
        let mut env = FixedEnvironment::constant(vec![Structure::uniform(1.0)]).unwrap();
        let mut corpse = entity(0, 0.5, 0.0, &config);
        let view = kin(vec![]);
        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 0,
        };

        assert!(corpse.step(&view, &mut env, &mut ctx, &mut rng).is_none());
        assert_eq!(ids.issued(), 0);
        assert_eq!(corpse.resource(), 0.0);
    }

    #[test]
    fn test_step_records_death_tick() {
        let config = no_repro_config();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ids = IdAllocator::new();
        let mut env = FixedEnvironment::constant(vec![Structure::default()]).unwrap();
        let mut frail = entity(0, 0.5, 0.02, &config);
        let view = kin(vec![]);
        let mut ctx = StepContext {
            config: &config,
            ids: &mut ids,
            tick: 33,
        };

        frail.step(&view, &mut env, &mut ctx, &mut rng);

        // cost = 0.01 + 0.02 = 0.03 > 0.02
        assert!(!frail.is_alive());
        assert_eq!(frail.died_at(), Some(33));
    }
}

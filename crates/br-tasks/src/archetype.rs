//! Ready-made brains for the stock mobs.
//!
//! Each constructor returns the brain together with a memory layout that
//! declares every module its behaviors, sensors, and activity rules touch.
//! Install the layout's store for the agent before the brain's first tick.

use br_behavior::{Behavior, BehaviorResult, Brain, EntryCondition, RunOne, Trigger, TriggerGate};
use br_core::ItemId;
use br_memory::catalog::{
    ATTACK_COOLING_DOWN, ATTACK_TARGET, BREED_TARGET, CANT_REACH_WALK_TARGET_SINCE, HOME,
    HURT_BY_ENTITY, INTERACTION_TARGET, IS_PANICKING, JOB_SITE, LAST_SLEPT, LAST_WOKEN,
    LAST_WORKED_AT_POI, LOOK_TARGET, MEETING_POINT, NEAREST_BED, NEAREST_HOSTILE,
    NEAREST_LIVING_ENTITIES, RAM_COOLDOWN_TICKS, RAM_TARGET, WALK_TARGET,
};
use br_memory::MemoryLayout;
use br_schedule::{Activity, Schedule};
use br_world::{EntityKind, PoiKind};

use crate::combat::{approach_attack_target, melee_attack, start_attacking, stop_attacking_if_target_invalid};
use crate::movement::{random_stroll, set_entity_look_target, set_walk_target_from_look_target, stroll_to_poi};
use crate::panic::{calm_down, flee, panic_trigger};
use crate::poi::{AcquirePoi, ValidateNearbyPoi};
use crate::rest::wake_up;
use crate::{
    AnimalMakeLove, CountDownCooldownTicks, CrossbowAttack, DoNothing, HarvestFarmland,
    HurtBySensor, JumpOnBed, LookAtTargetSink, MoveToTargetSink, NearestBedSensor,
    NearestLivingEntitiesSensor, PrepareRam, RamTarget, SleepInBed, TradeWithVillager,
};

/// Item villagers hand each other while gossiping.
pub const BREAD: ItemId = ItemId(0);

const WALK_SPEED: f32 = 0.5;
const FLEE_SPEED: f32 = 0.75;
const CHARGE_SPEED: f32 = 1.25;
/// Inclusive window the goat ram cooldown is drawn from.
const RAM_COOLDOWN: (u64, u64) = (600, 6_000);

/// A brain and the layout its agent's store must be built from.
pub struct Archetype {
    pub layout: MemoryLayout,
    pub brain:  Brain,
}

impl Archetype {
    fn new(layout: MemoryLayout, brain: Brain) -> Self {
        let mut layout = layout;
        brain.extend_layout(&mut layout);
        Self { layout, brain }
    }
}

// ── Shared pieces ─────────────────────────────────────────────────────────────

fn boxed_trigger(trigger: impl Trigger + 'static) -> Box<dyn Behavior> {
    trigger.one_shot().boxed()
}

fn look_at(filter: fn(EntityKind) -> bool, max_distance: f64) -> Box<dyn Behavior> {
    boxed_trigger(set_entity_look_target(filter, max_distance))
}

/// Stroll somewhere or stand around, picked at random.
fn idle_wander(speed: f32) -> Box<dyn Behavior> {
    Box::new(RunOne::named(
        "idle_wander",
        vec![
            (boxed_trigger(random_stroll(speed)), 1),
            (DoNothing::timed(30, 60).boxed(), 1),
        ],
    ))
}

fn sinks() -> Vec<Box<dyn Behavior>> {
    vec![LookAtTargetSink::timed().boxed(), MoveToTargetSink::timed().boxed()]
}

fn any_kind(_: EntityKind) -> bool {
    true
}

fn is_villager(kind: EntityKind) -> bool {
    kind == EntityKind::Villager
}

fn is_player(kind: EntityKind) -> bool {
    kind == EntityKind::Player
}

fn is_prey(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Villager | EntityKind::Player)
}

fn movement_layout() -> MemoryLayout {
    MemoryLayout::new()
        .with(WALK_TARGET)
        .with(LOOK_TARGET)
        .with(CANT_REACH_WALK_TARGET_SINCE)
        .with(NEAREST_LIVING_ENTITIES)
}

// ── Villagers ─────────────────────────────────────────────────────────────────

fn villager_layout() -> MemoryLayout {
    movement_layout()
        .with(HOME)
        .with(JOB_SITE)
        .with(MEETING_POINT)
        .with(INTERACTION_TARGET)
        .with(BREED_TARGET)
        .with(NEAREST_HOSTILE)
        .with(NEAREST_BED)
        .with(HURT_BY_ENTITY)
        .with(LAST_SLEPT)
        .with(LAST_WOKEN)
        .with(LAST_WORKED_AT_POI)
        .with(IS_PANICKING)
}

fn upkeep(trigger: impl Trigger + 'static) -> (Box<dyn Trigger>, u32) {
    (Box::new(trigger), 1)
}

fn villager_core() -> Vec<Box<dyn Behavior>> {
    let mut core = sinks();
    core.push(boxed_trigger(panic_trigger(true)));
    core.push(boxed_trigger(wake_up()));
    core.push(
        TriggerGate::try_all_ordered(
            "poi_upkeep",
            vec![
                upkeep(ValidateNearbyPoi::new(PoiKind::Home, HOME)),
                upkeep(ValidateNearbyPoi::new(PoiKind::JobSite, JOB_SITE)),
                upkeep(ValidateNearbyPoi::new(PoiKind::Meeting, MEETING_POINT)),
                upkeep(AcquirePoi::new(PoiKind::Home, HOME, false)),
                upkeep(AcquirePoi::new(PoiKind::JobSite, JOB_SITE, true)),
                upkeep(AcquirePoi::new(PoiKind::Meeting, MEETING_POINT, true)),
            ],
        )
        .boxed(),
    );
    core
}

fn villager_rest() -> Vec<Box<dyn Behavior>> {
    vec![SleepInBed::timed().boxed(), boxed_trigger(stroll_to_poi(HOME, WALK_SPEED, 1, 2.0))]
}

fn villager_panic() -> Vec<Box<dyn Behavior>> {
    vec![boxed_trigger(calm_down(Activity::Idle, true)), boxed_trigger(flee(FLEE_SPEED, true))]
}

/// Adult villager: works at its job site, gossips at the meeting point,
/// sleeps in its bed, and flees from hostiles.
pub fn villager() -> BehaviorResult<Archetype> {
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, villager_core())
        .activity(
            Activity::Work,
            10,
            vec![
                HarvestFarmland::timed(WALK_SPEED).boxed(),
                boxed_trigger(stroll_to_poi(JOB_SITE, WALK_SPEED, 1, 8.0)),
            ],
        )
        .requirements(Activity::Work, EntryCondition::new().present(JOB_SITE))
        .activity(
            Activity::Meet,
            10,
            vec![
                TradeWithVillager::timed(BREAD).boxed(),
                boxed_trigger(stroll_to_poi(MEETING_POINT, WALK_SPEED, 3, 6.0)),
                look_at(is_villager, 8.0),
            ],
        )
        .requirements(Activity::Meet, EntryCondition::new().present(MEETING_POINT))
        .erase_on_exit(Activity::Meet, vec![INTERACTION_TARGET.key()])
        .activity(
            Activity::Idle,
            10,
            vec![TradeWithVillager::timed(BREAD).boxed(), look_at(any_kind, 8.0), idle_wander(WALK_SPEED)],
        )
        .activity(Activity::Rest, 10, villager_rest())
        .activity(Activity::Panic, 10, villager_panic())
        .erase_on_exit(Activity::Panic, vec![IS_PANICKING.key()])
        .default_activity(Activity::Idle)
        .schedule(Schedule::villager_default())
        .sensor(NearestLivingEntitiesSensor)
        .sensor(HurtBySensor::default())
        .build()?;
    Ok(Archetype::new(villager_layout(), brain))
}

/// Baby villager: plays (and jumps on beds) instead of working.
pub fn baby_villager() -> BehaviorResult<Archetype> {
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, villager_core())
        .activity(
            Activity::Play,
            10,
            vec![JumpOnBed::timed(WALK_SPEED).boxed(), look_at(any_kind, 8.0), idle_wander(WALK_SPEED)],
        )
        .activity(Activity::Idle, 10, vec![look_at(any_kind, 8.0), idle_wander(WALK_SPEED)])
        .activity(Activity::Rest, 10, villager_rest())
        .activity(Activity::Panic, 10, villager_panic())
        .erase_on_exit(Activity::Panic, vec![IS_PANICKING.key()])
        .default_activity(Activity::Idle)
        .schedule(Schedule::villager_baby())
        .sensor(NearestLivingEntitiesSensor)
        .sensor(NearestBedSensor)
        .sensor(HurtBySensor::default())
        .build()?;
    Ok(Archetype::new(villager_layout(), brain))
}

// ── Goats ─────────────────────────────────────────────────────────────────────

/// Goat: wanders, breeds, and rams anything that is not a goat.
///
/// `Ram` is valid whenever the ram cooldown is over, no breeding is under
/// way, and something is in sensing range.  Inside it `PrepareRam` lines up
/// on a victim and `RamTarget` charges; the charge sets the cooldown, which
/// drops the goat back to `Idle`.
pub fn goat() -> BehaviorResult<Archetype> {
    let mut core = sinks();
    core.push(CountDownCooldownTicks::timed(RAM_COOLDOWN_TICKS).boxed());
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, core)
        .activity(
            Activity::Idle,
            10,
            vec![
                AnimalMakeLove::timed(EntityKind::Goat, WALK_SPEED).boxed(),
                look_at(is_player, 6.0),
                idle_wander(WALK_SPEED),
            ],
        )
        .activity(
            Activity::Ram,
            10,
            vec![RamTarget::timed(CHARGE_SPEED, RAM_COOLDOWN).boxed(), PrepareRam::timed(CHARGE_SPEED).boxed()],
        )
        .requirements(
            Activity::Ram,
            EntryCondition::new()
                .absent(RAM_COOLDOWN_TICKS)
                .absent(BREED_TARGET)
                .present(NEAREST_LIVING_ENTITIES),
        )
        .erase_on_exit(Activity::Ram, vec![RAM_TARGET.key()])
        .first_valid(vec![Activity::Ram, Activity::Idle])
        .default_activity(Activity::Idle)
        .sensor(NearestLivingEntitiesSensor)
        .build()?;
    let layout = movement_layout().with(BREED_TARGET).with(RAM_TARGET).with(RAM_COOLDOWN_TICKS);
    Ok(Archetype::new(layout, brain))
}

// ── Pillagers ─────────────────────────────────────────────────────────────────

const PILLAGER_REACH: f64 = 12.0;
const MELEE_REACH: f64 = 1.5;
const MELEE_DAMAGE: f32 = 3.0;
const MELEE_COOLDOWN: u64 = 20;

/// Pillager: hunts villagers and players, shooting from range and hitting
/// anything that gets close.
pub fn pillager() -> BehaviorResult<Archetype> {
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, sinks())
        .activity(
            Activity::Idle,
            10,
            vec![boxed_trigger(start_attacking(is_prey)), look_at(is_prey, 12.0), idle_wander(WALK_SPEED)],
        )
        .activity(
            Activity::Fight,
            10,
            vec![
                boxed_trigger(stop_attacking_if_target_invalid()),
                boxed_trigger(approach_attack_target(WALK_SPEED, PILLAGER_REACH)),
                boxed_trigger(melee_attack(MELEE_REACH, MELEE_DAMAGE, MELEE_COOLDOWN)),
                CrossbowAttack::timed().boxed(),
            ],
        )
        .requirements(Activity::Fight, EntryCondition::new().present(ATTACK_TARGET))
        .erase_on_exit(Activity::Fight, vec![ATTACK_TARGET.key()])
        .first_valid(vec![Activity::Fight, Activity::Idle])
        .default_activity(Activity::Idle)
        .sensor(NearestLivingEntitiesSensor)
        .build()?;
    let layout = movement_layout().with(ATTACK_TARGET).with(ATTACK_COOLING_DOWN);
    Ok(Archetype::new(layout, brain))
}

// ── Passive animals ───────────────────────────────────────────────────────────

/// Cat: wanders, follows players it notices, and breeds.
pub fn cat() -> BehaviorResult<Archetype> {
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, sinks())
        .activity(
            Activity::Idle,
            10,
            vec![
                AnimalMakeLove::timed(EntityKind::Cat, WALK_SPEED).boxed(),
                look_at(is_player, 10.0),
                boxed_trigger(set_walk_target_from_look_target(WALK_SPEED, 2)),
                idle_wander(WALK_SPEED),
            ],
        )
        .default_activity(Activity::Idle)
        .sensor(NearestLivingEntitiesSensor)
        .build()?;
    Ok(Archetype::new(movement_layout().with(BREED_TARGET), brain))
}

/// Cow: wanders and breeds; panics and runs when hurt.
pub fn cow() -> BehaviorResult<Archetype> {
    let mut core = sinks();
    core.push(boxed_trigger(panic_trigger(false)));
    let brain = Brain::builder()
        .core_activity(Activity::Core)
        .activity(Activity::Core, 0, core)
        .activity(
            Activity::Idle,
            10,
            vec![
                AnimalMakeLove::timed(EntityKind::Cow, WALK_SPEED).boxed(),
                look_at(is_player, 6.0),
                idle_wander(WALK_SPEED),
            ],
        )
        .activity(
            Activity::Panic,
            10,
            vec![boxed_trigger(calm_down(Activity::Idle, false)), boxed_trigger(flee(FLEE_SPEED, false))],
        )
        .erase_on_exit(Activity::Panic, vec![IS_PANICKING.key()])
        .default_activity(Activity::Idle)
        .sensor(NearestLivingEntitiesSensor)
        .sensor(HurtBySensor::default())
        .build()?;
    let layout = movement_layout().with(BREED_TARGET).with(HURT_BY_ENTITY).with(IS_PANICKING);
    Ok(Archetype::new(layout, brain))
}

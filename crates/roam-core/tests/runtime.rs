//! Runtime tests against a scripted game server.
//!
//! The scripted client answers each call with the next queued reply (or an
//! empty one) and records what was asked, so every test reads as "the
//! server says X, the agent does Y".

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc
)]

use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use roam_agents::{DataFault, Effect, FaultPolicy};
use roam_core::{
    Agent, AgentError, BotConfig, ClientError, ClientResult, Fleet, FleetContext, GameClient,
};
use roam_types::{
    ConfirmDialog, GameResponse, GoodsItem, MapUnit, PlayerPatch, Position, PurchaseLine,
    ShopInfo, ShopListing, UnitKind,
};
use roam_world::sample_catalog;

// =============================================================================
// Scripted client
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Init,
    Hey { unit: String, skill: String },
    Go(i64, i64),
    Task { npc: String, tid: String },
    UseGoods { id: String, all: bool },
    Equip(u64),
    Sell(u64),
    Buy { npc: String, shop_id: String, lines: Vec<PurchaseLine> },
    Upgrade,
    ConfirmUpgrade,
}

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<ClientResult>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Clone, Default)]
struct ScriptedClient(Arc<Script>);

impl ScriptedClient {
    fn queue(&self, reply: GameResponse) {
        self.0.replies.lock().unwrap().push_back(Ok(Some(reply)));
    }

    fn calls(&self) -> Vec<Call> {
        self.0.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: Call) -> impl Future<Output = ClientResult> + Send {
        self.0.calls.lock().unwrap().push(call);
        let reply = self.0.replies.lock().unwrap().pop_front().unwrap_or(Ok(None));
        ready(reply)
    }
}

impl GameClient for ScriptedClient {
    fn init(&self) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Init)
    }

    fn hey(
        &self,
        unit_id: &str,
        skill_id: &str,
        _x: i64,
        _y: i64,
    ) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Hey {
            unit: unit_id.to_owned(),
            skill: skill_id.to_owned(),
        })
    }

    fn go(&self, x: i64, y: i64) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Go(x, y))
    }

    fn task(&self, npc: &str, tid: &str) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Task {
            npc: npc.to_owned(),
            tid: tid.to_owned(),
        })
    }

    fn use_goods(&self, id: &str, all: bool) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::UseGoods {
            id: id.to_owned(),
            all,
        })
    }

    fn equip(&self, id: u64) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Equip(id))
    }

    fn sell(&self, id: u64) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Sell(id))
    }

    fn buy(
        &self,
        npc: &str,
        shop_id: &str,
        lines: &[PurchaseLine],
    ) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Buy {
            npc: npc.to_owned(),
            shop_id: shop_id.to_owned(),
            lines: lines.to_vec(),
        })
    }

    fn upgrade(&self) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::Upgrade)
    }

    fn confirm_upgrade(&self) -> impl Future<Output = ClientResult> + Send {
        self.answer(Call::ConfirmUpgrade)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn unit(id: &str, name: &str, kind: UnitKind, hp: u64, lv: u32, x: i64, y: i64) -> MapUnit {
    MapUnit {
        id: id.to_owned(),
        hp,
        hp_c: hp,
        lv,
        name: name.to_owned(),
        kind,
        x,
        y,
    }
}

fn wild_dog(x: i64, y: i64) -> MapUnit {
    unit("dog", "Wild Dog", UnitKind::M1, 60, 5, x, y)
}

fn goods(id: &str, count: u64) -> GoodsItem {
    GoodsItem {
        count,
        id: id.to_owned(),
        mark: String::new(),
        name: id.to_owned(),
        quality: 1,
        kind: 1,
    }
}

/// A level-5 session on Town with full recovery pools and stocked goods.
fn snapshot(username: &str, at: (i64, i64), units: Vec<MapUnit>) -> GameResponse {
    GameResponse {
        player: Some(PlayerPatch {
            username: Some(username.to_owned()),
            lv: Some(5),
            gold: Some(5000),
            hp: Some(100),
            hp_c: Some(100),
            mp: Some(50),
            mp_c: Some(50),
            hp_recovery: Some(100_000),
            mp_recovery: Some(100_000),
            speed: Some(1),
            attack_distance: Some(1),
            ..PlayerPatch::default()
        }),
        pos: Some(Position {
            name: "Town".to_owned(),
            size_x: 50,
            size_y: 50,
            x: at.0,
            y: at.1,
        }),
        map_units: Some(units),
        goods_list: Some(vec![goods("bandage", 50)]),
        equip_list: Some(Vec::new()),
        ..GameResponse::default()
    }
}

struct Harness {
    client: ScriptedClient,
    fleet: Arc<Fleet>,
    agent: Agent<ScriptedClient>,
}

async fn harness(policy: FaultPolicy, config: BotConfig) -> Harness {
    let client = ScriptedClient::default();
    let fleet = Arc::new(Fleet::new());
    let destroyed = fleet.register("ann").await;
    let ctx = FleetContext {
        catalog: Arc::new(sample_catalog().unwrap()),
        fleet: Arc::clone(&fleet),
        fault_policy: policy,
    };
    let agent = Agent::new(client.clone(), "ann", config, ctx, destroyed)
        .with_rng(StdRng::seed_from_u64(7));
    Harness {
        client,
        fleet,
        agent,
    }
}

fn battle_config() -> BotConfig {
    BotConfig {
        skill_id: "s1".to_owned(),
        ..BotConfig::default()
    }
}

/// Push periodic work out of the way and finish the one-shot quests.
fn settle(agent: &mut Agent<ScriptedClient>) {
    let later = Utc::now() + Duration::hours(1);
    agent.state_mut().apply_all([
        Effect::ScheduleMaintenance(later),
        Effect::ScheduleResupply(later),
        Effect::CompleteQuest("welcome".to_owned()),
        Effect::CompleteQuest("elder".to_owned()),
    ]);
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn init_loads_the_snapshot() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    h.client.queue(snapshot("ann", (10, 10), vec![wild_dog(10, 11)]));

    h.agent.init().await.unwrap();
    let state = h.agent.state();
    assert_eq!(state.player.lv, 5);
    assert_eq!(state.pos.name, "Town");
    assert_eq!(state.map_units.len(), 1);
    assert_eq!(h.client.calls(), vec![Call::Init]);
}

#[tokio::test]
async fn init_rejects_another_account() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    h.client.queue(snapshot("bob", (10, 10), Vec::new()));

    let err = h.agent.init().await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::UsernameMismatch { ref expected, ref actual } if expected == "ann" && actual == "bob"
    ));
}

#[tokio::test]
async fn unknown_monster_is_fatal_only_under_strict_policy() {
    let dragon = unit("d1", "Dragon", UnitKind::M1, 9000, 90, 20, 20);

    let mut strict = harness(FaultPolicy::Strict, battle_config()).await;
    strict.client.queue(snapshot("ann", (10, 10), vec![dragon.clone()]));
    let err = strict.agent.init().await.unwrap_err();
    assert!(matches!(err, AgentError::Data(ref f) if matches!(**f, DataFault::UnknownMonster { .. })));
    assert!(err.halts_fleet());

    let mut tolerant = harness(FaultPolicy::Tolerant, battle_config()).await;
    tolerant.client.queue(snapshot("ann", (10, 10), vec![dragon]));
    tolerant.agent.init().await.unwrap();
}

#[tokio::test]
async fn destroyed_agent_stops_without_requests() {
    let h = harness(FaultPolicy::Strict, battle_config()).await;
    h.fleet.remove("ann").await;

    h.agent.run().await.unwrap();
    assert!(h.client.calls().is_empty());
    assert!(!h.fleet.is_halted());
}

// =============================================================================
// Combat
// =============================================================================

#[tokio::test(start_paused = true)]
async fn attack_locks_target_and_tolerates_drop_gaps() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    h.client.queue(snapshot("ann", (10, 10), vec![wild_dog(10, 11)]));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    h.client.queue(GameResponse {
        normal_news: Some("You gained Egg, Bone.".to_owned()),
        ..GameResponse::default()
    });
    h.agent.tick().await.unwrap();

    assert_eq!(
        h.client.calls()[1],
        Call::Hey {
            unit: "dog".to_owned(),
            skill: "s1".to_owned(),
        }
    );
    let memory = &h.agent.state().memory;
    assert_eq!(memory.locked_target.as_deref(), Some("dog"));
    assert_eq!(memory.last_engaged.as_deref(), Some("Wild Dog"));
    assert_eq!(memory.farm_map.as_deref(), Some("Town"));
}

#[tokio::test(start_paused = true)]
async fn death_halts_the_whole_fleet() {
    let mut h = harness(FaultPolicy::Tolerant, battle_config()).await;
    let bystander = h.fleet.register("bob").await;
    h.client.queue(snapshot("ann", (10, 10), vec![wild_dog(10, 11)]));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    h.client.queue(GameResponse {
        normal_news: Some("You died. Wild Dog was too strong.".to_owned()),
        ..GameResponse::default()
    });
    let err = h.agent.run().await.unwrap_err();

    assert!(matches!(err, AgentError::Died { ref username } if username == "ann"));
    assert!(h.fleet.is_halted());
    assert!(bystander.load(Ordering::Acquire));
}

#[tokio::test(start_paused = true)]
async fn death_narrated_after_a_move_halts_the_fleet() {
    let mut h = harness(FaultPolicy::Tolerant, battle_config()).await;
    let bystander = h.fleet.register("bob").await;
    h.client.queue(snapshot("ann", (10, 10), vec![wild_dog(10, 14)]));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    h.client.queue(GameResponse {
        normal_news: Some("You died. Wild Dog was too strong.".to_owned()),
        ..GameResponse::default()
    });
    let err = h.agent.run().await.unwrap_err();

    assert!(matches!(h.client.calls()[1], Call::Go(..)));
    assert!(matches!(err, AgentError::Died { ref username } if username == "ann"));
    assert!(h.fleet.is_halted());
    assert!(bystander.load(Ordering::Acquire));
}

#[tokio::test(start_paused = true)]
async fn last_fight_is_forgotten_only_after_the_corrective_step() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    h.client.queue(snapshot("ann", (10, 10), Vec::new()));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);
    h.agent.state_mut().apply_all([
        Effect::SetFarmMap("Town".to_owned()),
        Effect::LockTarget("gone".to_owned()),
        Effect::RecordEngagement("Wild Dog".to_owned()),
    ]);

    h.client.queue(GameResponse {
        temp_drop_msg: Some(vec!["Egg".to_owned(), "Crown".to_owned()]),
        ..GameResponse::default()
    });
    h.agent.tick().await.unwrap();

    assert!(matches!(h.client.calls()[1], Call::Go(..)));
    let memory = &h.agent.state().memory;
    assert_eq!(memory.locked_target, None);
    assert_eq!(memory.last_engaged, None);
}

// =============================================================================
// Talking
// =============================================================================

#[tokio::test(start_paused = true)]
async fn quest_talk_confirms_and_records_completion() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    let greeter = unit("g1", "Greeter", UnitKind::Npc, 1, 1, 3, 3);
    h.client.queue(snapshot("ann", (4, 4), vec![greeter]));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);
    h.agent.state_mut().completed_quests.remove("welcome");

    h.client.queue(GameResponse {
        confirm: Some(ConfirmDialog {
            title: "Welcome".to_owned(),
            content: "Take this.".to_owned(),
            npc: "77".to_owned(),
            tid: "42".to_owned(),
        }),
        ..GameResponse::default()
    });
    h.agent.tick().await.unwrap();

    assert_eq!(
        h.client.calls()[1..],
        [
            Call::Hey {
                unit: "g1".to_owned(),
                skill: "s1".to_owned(),
            },
            Call::Task {
                npc: "77".to_owned(),
                tid: "42".to_owned(),
            },
        ]
    );
    assert!(h.agent.state().completed_quests.contains("welcome"));
}

#[tokio::test(start_paused = true)]
async fn shop_talk_buys_a_balanced_restock() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    let clerk = unit("c1", "Clerk", UnitKind::Shop, 1, 1, 11, 11);
    let mut session = snapshot("ann", (10, 10), vec![clerk]);
    session.goods_list = Some(vec![goods("bandage", 3)]);
    h.client.queue(session);
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    h.client.queue(GameResponse {
        shop: Some(ShopInfo {
            name: "General Store".to_owned(),
            npc: "301".to_owned(),
            shop_id: "7".to_owned(),
            goods: vec![ShopListing {
                goods_id: "bandage".to_owned(),
                name: "Bandage".to_owned(),
                mark: String::new(),
                sell_gold: Some(10),
            }],
        }),
        ..GameResponse::default()
    });
    h.agent.tick().await.unwrap();

    // 5000 gold at 10 each lifts the 3 bandages held to 503.
    let buy = h.client.calls().pop().unwrap();
    assert_eq!(
        buy,
        Call::Buy {
            npc: "301".to_owned(),
            shop_id: "7".to_owned(),
            lines: vec![PurchaseLine {
                goods_id: "bandage".to_owned(),
                count: 500,
            }],
        }
    );
}

#[tokio::test(start_paused = true)]
async fn missing_shop_drops_only_this_agent() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    let clerk = unit("c1", "Clerk", UnitKind::Shop, 1, 1, 11, 11);
    let mut session = snapshot("ann", (10, 10), vec![clerk]);
    session.goods_list = Some(vec![goods("bandage", 3)]);
    h.client.queue(session);
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    let err = h.agent.run().await.unwrap_err();
    assert!(matches!(err, AgentError::ShopUnavailable { ref npc } if npc == "Clerk"));
    assert!(!h.fleet.is_halted());
    assert!(h.fleet.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn misrouted_transition_is_a_data_fault() {
    let config = BotConfig {
        map_name: Some("Mine".to_owned()),
        ..battle_config()
    };
    let mut h = harness(FaultPolicy::Strict, config).await;
    let gate = unit("io1", "Mine", UnitKind::Io, 1, 1, 25, 50);
    h.client.queue(snapshot("ann", (25, 49), vec![gate]));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);

    h.client.queue(GameResponse {
        pos: Some(Position {
            name: "Valley".to_owned(),
            size_x: 50,
            size_y: 50,
            x: 1,
            y: 1,
        }),
        map_units: Some(Vec::new()),
        ..GameResponse::default()
    });
    let err = h.agent.tick().await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::Data(ref f) if matches!(**f, DataFault::MisroutedTransition { ref actual, .. } if actual == "Valley")
    ));
}

#[tokio::test]
async fn client_errors_surface_from_tick() {
    let mut h = harness(FaultPolicy::Strict, battle_config()).await;
    h.client.queue(snapshot("ann", (10, 10), Vec::new()));
    h.agent.init().await.unwrap();
    settle(&mut h.agent);
    h.client.0.replies.lock().unwrap().push_back(Err(ClientError::Protocol {
        status: -1,
        message: "busy".to_owned(),
    }));

    let err = h.agent.tick().await.unwrap_err();
    assert!(matches!(err, AgentError::Client(ClientError::Protocol { status: -1, .. })));
    assert!(!err.halts_fleet());
}

//! The jump game simulation.
//!
//! A single-entity side-scroller ticked at a fixed rate in a 600x300
//! virtual-pixel space; rendering maps to cells separately. Level scaling
//! is capped so early levels stay forgiving: gravity and jump strength
//! stop growing after five levels' worth, while the collision margin
//! keeps shrinking toward its floor.
//!
//! Difficulty is checkpointed softly: a reset re-seeds score, speed and
//! spawn rate from the level the run ended on, not from level 1.

pub const WORLD_W: f32 = 600.0;
pub const WORLD_H: f32 = 300.0;
/// Ground line for the player's anchor point.
pub const GROUND_Y: f32 = 160.0;
/// Visual ground; obstacles stand on this.
pub const GROUND_LINE_Y: f32 = 190.0;
pub const PLAYER_X: f32 = 50.0;
pub const PLAYER_W: f32 = 90.0;
pub const PLAYER_H: f32 = 90.0;
pub const CRATE_PX: f32 = 30.0;
pub const OBSTACLE_W: f32 = 30.0;

pub const MAX_LEVEL: u32 = 10;
pub const POINTS_PER_OBSTACLE: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 50;
/// Physics scaling stops at this many levels above the first.
const LEVEL_SCALE_CAP: u32 = 5;

const BASE_COLLISION_MARGIN: f32 = 15.0;
const COLLISION_MARGIN_FLOOR: f32 = 5.0;
const COLLISION_MARGIN_STEP: f32 = 1.5;

/// Ticks between the collision and the GAME OVER banner accepting input.
const OVER_DELAY_TICKS: u32 = 30;

const SKYLINE_SCROLL_FACTOR: f32 = 0.3;
pub const SKYLINE_SEED: u32 = 12345;
pub const BUILDING_COUNT: usize = 20;
pub const BUILDING_W: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSet {
    Alien,
    Runner,
}

/// One game engine, two tunings: the slow-motion build and a tighter
/// arcade build, differing only in constants and sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamePreset {
    pub name: &'static str,
    pub base_gravity: f32,
    pub gravity_step: f32,
    pub base_jump: f32,
    pub jump_step: f32,
    pub double_jump: f32,
    pub base_speed: f32,
    pub speed_step: f32,
    pub base_spawn_rate: u32,
    pub spawn_rate_step: u32,
    pub spawn_rate_floor: u32,
    pub sprite: SpriteSet,
}

pub const FLOATY: GamePreset = GamePreset {
    name: "floaty",
    base_gravity: 0.15,
    gravity_step: 0.015,
    base_jump: -5.0,
    jump_step: 0.04,
    double_jump: -5.0,
    base_speed: 2.5,
    speed_step: 0.4,
    base_spawn_rate: 400,
    spawn_rate_step: 12,
    spawn_rate_floor: 200,
    sprite: SpriteSet::Alien,
};

pub const ARCADE: GamePreset = GamePreset {
    name: "arcade",
    base_gravity: 0.35,
    gravity_step: 0.03,
    base_jump: -7.5,
    jump_step: 0.06,
    double_jump: -7.5,
    base_speed: 3.5,
    speed_step: 0.5,
    base_spawn_rate: 300,
    spawn_rate_step: 12,
    spawn_rate_floor: 100,
    sprite: SpriteSet::Runner,
};

pub const PRESETS: &[GamePreset] = &[FLOATY, ARCADE];

pub fn preset_by_name(name: &str) -> Option<&'static GamePreset> {
    PRESETS.iter().find(|p| p.name == name.trim())
}

/// The multiplicative congruential generator the skyline was built with;
/// state stays below the modulus so the arithmetic never overflows u32.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const MODULUS: u32 = 233_280;

    pub fn new(seed: u32) -> Self {
        Self {
            state: seed % Self::MODULUS,
        }
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.state = (self.state * 9301 + 49297) % Self::MODULUS;
        self.state as f32 / Self::MODULUS as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub height: f32,
    /// Lit windows as (column, row) pairs, 3 columns wide.
    pub windows: Vec<(u32, u32)>,
}

/// The parallax skyline. Fixed seed: the same building layout every run.
pub fn build_skyline() -> Vec<Building> {
    let mut rng = Lcg::new(SKYLINE_SEED);
    (0..BUILDING_COUNT)
        .map(|_| {
            let height = 80.0 + rng.next_f32() * 100.0;
            let window_rows = (height / 15.0) as u32;
            let mut windows = Vec::new();
            for row in 0..window_rows {
                for col in 0..3 {
                    if rng.next_f32() > 0.3 {
                        windows.push((col, row));
                    }
                }
            }
            Building { height, windows }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBody {
    pub y: f32,
    pub velocity_y: f32,
    pub jumping: bool,
    pub double_jump_available: bool,
    pub has_double_jumped: bool,
}

impl PlayerBody {
    fn grounded() -> Self {
        Self {
            y: GROUND_Y,
            velocity_y: 0.0,
            jumping: false,
            double_jump_available: false,
            has_double_jumped: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

pub struct GameSim {
    pub preset: &'static GamePreset,
    pub player: PlayerBody,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub level: u32,
    pub failed_level: u32,
    pub game_speed: f32,
    pub spawn_rate: u32,
    pub frame_count: u64,
    pub game_over: bool,
    over_ticks: u32,
    pub high_score: u32,
    high_score_dirty: bool,
    pub skyline_offset: f32,
    pub anim_frame: usize,
    anim_counter: u32,
    rng: Lcg,
}

impl GameSim {
    pub fn new(preset: &'static GamePreset, high_score: u32, rng_seed: u32) -> Self {
        Self {
            preset,
            player: PlayerBody::grounded(),
            obstacles: Vec::new(),
            score: 0,
            level: 1,
            failed_level: 1,
            game_speed: preset.base_speed,
            spawn_rate: preset.base_spawn_rate,
            frame_count: 0,
            game_over: false,
            over_ticks: 0,
            high_score,
            high_score_dirty: false,
            skyline_offset: 0.0,
            anim_frame: 0,
            anim_counter: 0,
            rng: Lcg::new(rng_seed),
        }
    }

    pub fn gravity(&self) -> f32 {
        let scaled = self.level.saturating_sub(1).min(LEVEL_SCALE_CAP);
        self.preset.base_gravity + scaled as f32 * self.preset.gravity_step
    }

    pub fn jump_strength(&self) -> f32 {
        let scaled = self.level.saturating_sub(1).min(LEVEL_SCALE_CAP);
        self.preset.base_jump - scaled as f32 * self.preset.jump_step
    }

    /// Forgiveness shrinks as levels climb, floored so a sliver of grace
    /// always remains.
    pub fn collision_margin(&self) -> f32 {
        let scaled = self.level.saturating_sub(1).min(LEVEL_SCALE_CAP);
        (BASE_COLLISION_MARGIN - scaled as f32 * COLLISION_MARGIN_STEP)
            .max(COLLISION_MARGIN_FLOOR)
    }

    /// First press jumps from the ground; a second press while airborne
    /// consumes the one double jump available per airborne period.
    pub fn jump(&mut self) {
        if self.game_over {
            return;
        }
        if !self.player.jumping {
            self.player.velocity_y = self.jump_strength();
            self.player.jumping = true;
            self.player.double_jump_available = true;
            self.player.has_double_jumped = false;
        } else if self.player.double_jump_available && !self.player.has_double_jumped {
            self.player.velocity_y = self.preset.double_jump;
            self.player.has_double_jumped = true;
            self.player.double_jump_available = false;
        }
    }

    /// The GAME OVER banner (and the restart key) waits out a short delay
    /// after the collision.
    pub fn over_visible(&self) -> bool {
        self.game_over && self.over_ticks >= OVER_DELAY_TICKS
    }

    /// Restart at the difficulty the run ended on.
    pub fn reset(&mut self) {
        if !self.over_visible() {
            return;
        }
        let failed = self.failed_level;
        self.player = PlayerBody::grounded();
        self.obstacles.clear();
        self.game_over = false;
        self.over_ticks = 0;
        self.frame_count = 0;
        self.skyline_offset = 0.0;
        self.level = failed;
        self.score = (failed - 1) * POINTS_PER_LEVEL;
        self.game_speed = self.preset.base_speed + (failed - 1) as f32 * self.preset.speed_step;
        self.spawn_rate = self
            .preset
            .base_spawn_rate
            .saturating_sub((failed - 1) * self.preset.spawn_rate_step)
            .max(self.preset.spawn_rate_floor);
    }

    /// True once after each new high score; the caller persists it.
    pub fn take_high_score_update(&mut self) -> Option<u32> {
        if self.high_score_dirty {
            self.high_score_dirty = false;
            Some(self.high_score)
        } else {
            None
        }
    }

    pub fn tick(&mut self) {
        if self.game_over {
            self.over_ticks = self.over_ticks.saturating_add(1);
            return;
        }

        // Integrate.
        self.player.velocity_y += self.gravity();
        self.player.y += self.player.velocity_y;
        if self.player.y >= GROUND_Y {
            self.player = PlayerBody::grounded();
        }

        self.skyline_offset -= self.game_speed * SKYLINE_SCROLL_FACTOR;

        // Spawn.
        self.frame_count += 1;
        if self.frame_count % u64::from(self.spawn_rate) == 0 {
            self.spawn_wave();
        }

        // Advance and retire obstacles; scoring happens on retirement.
        let speed = self.game_speed;
        let mut retired = 0;
        self.obstacles.retain_mut(|obstacle| {
            obstacle.x -= speed;
            let alive = obstacle.x + obstacle.width >= 0.0;
            if !alive {
                retired += 1;
            }
            alive
        });
        for _ in 0..retired {
            self.score += POINTS_PER_OBSTACLE;
            if self.score > self.high_score {
                self.high_score = self.score;
                self.high_score_dirty = true;
            }
            let new_level = (self.score / POINTS_PER_LEVEL + 1).min(MAX_LEVEL);
            if new_level > self.level {
                self.level = new_level;
                self.game_speed += self.preset.speed_step;
                self.spawn_rate = self
                    .spawn_rate
                    .saturating_sub(self.preset.spawn_rate_step)
                    .max(self.preset.spawn_rate_floor);
            }
        }

        // Collision against the effective hitbox: shrunk on both sides by
        // the margin and offset from the sprite's visual box.
        let margin = self.collision_margin();
        for obstacle in &self.obstacles {
            let overlaps = PLAYER_X + margin < obstacle.x + obstacle.width
                && PLAYER_X - 50.0 + PLAYER_W - margin > obstacle.x - 40.0
                && (self.player.y - 50.0) + PLAYER_H - margin > GROUND_LINE_Y - obstacle.height;
            if overlaps {
                self.game_over = true;
                self.over_ticks = 0;
                self.failed_level = self.level;
                break;
            }
        }

        // Run-cycle animation pauses while airborne.
        if !self.player.jumping {
            self.anim_counter += 1;
            if self.anim_counter >= 10 {
                self.anim_frame = (self.anim_frame + 1) % 2;
                self.anim_counter = 0;
            }
        }
    }

    fn max_crates(&self) -> u32 {
        if self.level >= 6 {
            3
        } else if self.level >= 3 {
            2
        } else {
            1
        }
    }

    fn spawn_wave(&mut self) {
        let max_crates = self.max_crates();
        let crates = (self.rng.next_f32() * max_crates as f32) as u32 + 1;
        self.obstacles.push(Obstacle {
            x: WORLD_W,
            width: OBSTACLE_W,
            height: crates as f32 * CRATE_PX,
        });

        if self.level >= 4 && self.rng.next_f32() < 0.25 {
            let crates = (self.rng.next_f32() * max_crates.min(2) as f32) as u32 + 1;
            self.obstacles.push(Obstacle {
                x: WORLD_W + 120.0 + self.rng.next_f32() * 60.0,
                width: OBSTACLE_W,
                height: crates as f32 * CRATE_PX,
            });
        }

        if self.level >= 7 && self.rng.next_f32() < 0.2 {
            let crates = (self.rng.next_f32() * 2.0) as u32 + 1;
            self.obstacles.push(Obstacle {
                x: WORLD_W + 250.0 + self.rng.next_f32() * 70.0,
                width: OBSTACLE_W,
                height: crates as f32 * CRATE_PX,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> GameSim {
        GameSim::new(&FLOATY, 0, 1)
    }

    #[test]
    fn one_tick_integrates_gravity() {
        let mut sim = sim();
        sim.jump();
        let v0 = sim.player.velocity_y;
        let y0 = sim.player.y;
        let g = sim.gravity();
        sim.tick();
        assert!((sim.player.velocity_y - (v0 + g)).abs() < 1e-6);
        assert!((sim.player.y - (y0 + v0 + g)).abs() < 1e-6);
    }

    #[test]
    fn landing_clamps_and_clears_flags() {
        let mut sim = sim();
        sim.jump();
        for _ in 0..2000 {
            sim.tick();
            if !sim.player.jumping {
                break;
            }
        }
        assert_eq!(sim.player.y, GROUND_Y);
        assert_eq!(sim.player.velocity_y, 0.0);
        assert!(!sim.player.jumping);
        assert!(!sim.player.double_jump_available);
    }

    #[test]
    fn double_jump_consumed_once_per_airborne_period() {
        let mut sim = sim();
        sim.jump();
        assert!(sim.player.double_jump_available);
        sim.tick();
        sim.jump();
        assert!(sim.player.has_double_jumped);
        assert!(!sim.player.double_jump_available);
        let velocity_after_double = sim.player.velocity_y;
        // A third press is ignored.
        sim.tick();
        sim.jump();
        assert!((sim.player.velocity_y - (velocity_after_double + sim.gravity())).abs() < 1e-6);
    }

    #[test]
    fn jump_on_ground_uses_level_scaled_strength() {
        let mut sim = sim();
        sim.level = 3;
        sim.jump();
        let expected = FLOATY.base_jump - 2.0 * FLOATY.jump_step;
        assert!((sim.player.velocity_y - expected).abs() < 1e-6);
    }

    #[test]
    fn gravity_scaling_caps_at_five_levels() {
        let mut sim = sim();
        sim.level = 6;
        let capped = sim.gravity();
        sim.level = 10;
        assert_eq!(sim.gravity(), capped);
    }

    #[test]
    fn retired_obstacle_scores_ten_and_recalculates_level() {
        let mut sim = sim();
        sim.score = 40;
        sim.obstacles.push(Obstacle {
            x: 1.0,
            width: OBSTACLE_W,
            height: CRATE_PX,
        });
        // One tick at speed 2.5 moves x to -1.5; still on screen
        // (x + width >= 0), so nothing scores yet.
        sim.tick();
        assert_eq!(sim.score, 40);
        // Push it fully off the left edge.
        for _ in 0..12 {
            sim.tick();
        }
        assert_eq!(sim.score, 50);
        assert_eq!(sim.level, 2);
    }

    #[test]
    fn level_up_accelerates_and_tightens_spawns() {
        let mut sim = sim();
        sim.score = 40;
        let speed_before = sim.game_speed;
        let spawn_before = sim.spawn_rate;
        sim.obstacles.push(Obstacle {
            x: -0.1 + sim.game_speed, // retires on the next tick
            width: 0.0,
            height: CRATE_PX,
        });
        sim.tick();
        assert_eq!(sim.level, 2);
        assert!((sim.game_speed - (speed_before + FLOATY.speed_step)).abs() < 1e-6);
        assert_eq!(sim.spawn_rate, spawn_before - FLOATY.spawn_rate_step);
    }

    #[test]
    fn spawn_rate_never_drops_below_preset_floor() {
        let mut sim = sim();
        sim.spawn_rate = FLOATY.spawn_rate_floor + 5;
        sim.score = 90;
        sim.obstacles.push(Obstacle {
            x: -0.1 + sim.game_speed,
            width: 0.0,
            height: CRATE_PX,
        });
        sim.tick();
        assert_eq!(sim.spawn_rate, FLOATY.spawn_rate_floor);
    }

    #[test]
    fn high_score_is_monotone_and_reported_once() {
        let mut sim = GameSim::new(&FLOATY, 15, 1);
        sim.obstacles.push(Obstacle {
            x: -0.1 + sim.game_speed,
            width: 0.0,
            height: CRATE_PX,
        });
        sim.tick();
        assert_eq!(sim.score, 10);
        assert_eq!(sim.high_score, 15);
        assert_eq!(sim.take_high_score_update(), None);

        sim.score = 20;
        sim.obstacles.push(Obstacle {
            x: -0.1 + sim.game_speed,
            width: 0.0,
            height: CRATE_PX,
        });
        sim.tick();
        assert_eq!(sim.high_score, 30);
        assert_eq!(sim.take_high_score_update(), Some(30));
        assert_eq!(sim.take_high_score_update(), None);
    }

    #[test]
    fn collision_freezes_simulation_and_records_level() {
        let mut sim = sim();
        sim.level = 4;
        sim.obstacles.push(Obstacle {
            x: PLAYER_X,
            width: OBSTACLE_W,
            height: 3.0 * CRATE_PX,
        });
        sim.tick();
        assert!(sim.game_over);
        assert_eq!(sim.failed_level, 4);
        assert!(!sim.over_visible());

        let frozen = sim.player.clone();
        for _ in 0..40 {
            sim.tick();
        }
        assert_eq!(sim.player, frozen);
        assert!(sim.over_visible());
    }

    #[test]
    fn grounded_player_collides_at_its_own_column() {
        let mut sim = sim();
        // A single crate at the player's column: the grounded sprite
        // overlaps it, so this is a hit even at level 1 margin.
        sim.obstacles.push(Obstacle {
            x: PLAYER_X,
            width: OBSTACLE_W,
            height: CRATE_PX,
        });
        sim.tick();
        assert!(sim.game_over);
    }

    #[test]
    fn margin_shrinks_with_level_to_a_floor() {
        let mut sim = sim();
        sim.level = 1;
        assert_eq!(sim.collision_margin(), 15.0);
        sim.level = 5;
        assert_eq!(sim.collision_margin(), 9.0);
        sim.level = 10;
        assert_eq!(sim.collision_margin(), 7.5);
    }

    #[test]
    fn reset_checkpoints_difficulty_from_failed_level() {
        let mut sim = sim();
        sim.level = 4;
        sim.obstacles.push(Obstacle {
            x: PLAYER_X,
            width: OBSTACLE_W,
            height: 3.0 * CRATE_PX,
        });
        sim.tick();
        assert!(sim.game_over);
        for _ in 0..OVER_DELAY_TICKS {
            sim.tick();
        }
        sim.reset();
        assert!(!sim.game_over);
        assert_eq!(sim.level, 4);
        assert_eq!(sim.score, 150);
        assert!((sim.game_speed - (FLOATY.base_speed + 3.0 * FLOATY.speed_step)).abs() < 1e-6);
        assert_eq!(
            sim.spawn_rate,
            (FLOATY.base_spawn_rate - 3 * FLOATY.spawn_rate_step).max(FLOATY.spawn_rate_floor)
        );
        assert!(sim.obstacles.is_empty());
    }

    #[test]
    fn reset_before_banner_is_ignored() {
        let mut sim = sim();
        sim.obstacles.push(Obstacle {
            x: PLAYER_X,
            width: OBSTACLE_W,
            height: CRATE_PX,
        });
        sim.tick();
        assert!(sim.game_over);
        sim.reset();
        assert!(sim.game_over);
    }

    #[test]
    fn spawn_counts_respect_level_caps() {
        for (level, expected_max) in [(1, 1), (3, 2), (6, 3)] {
            let mut sim = GameSim::new(&FLOATY, 0, 7);
            sim.level = level;
            for _ in 0..50 {
                sim.spawn_wave();
            }
            let max_crates = sim
                .obstacles
                .iter()
                .map(|o| (o.height / CRATE_PX) as u32)
                .max()
                .unwrap_or(0);
            assert!(max_crates <= expected_max, "level {level}");
            assert!(sim.obstacles.iter().all(|o| o.height >= CRATE_PX));
        }
    }

    #[test]
    fn low_levels_spawn_single_obstacles_per_wave() {
        let mut sim = GameSim::new(&FLOATY, 0, 3);
        sim.level = 1;
        sim.spawn_wave();
        assert_eq!(sim.obstacles.len(), 1);
        assert_eq!(sim.obstacles[0].x, WORLD_W);
    }

    #[test]
    fn skyline_is_reproducible() {
        let first = build_skyline();
        let second = build_skyline();
        assert_eq!(first, second);
        assert_eq!(first.len(), BUILDING_COUNT);
        for building in &first {
            assert!(building.height >= 80.0 && building.height < 180.0);
            for (col, _) in &building.windows {
                assert!(*col < 3);
            }
        }
    }

    #[test]
    fn animation_pauses_while_airborne() {
        let mut sim = sim();
        for _ in 0..10 {
            sim.tick();
        }
        assert_eq!(sim.anim_frame, 1);
        sim.jump();
        let frame = sim.anim_frame;
        for _ in 0..10 {
            sim.tick();
            if !sim.player.jumping {
                break;
            }
        }
        assert_eq!(sim.anim_frame, frame);
    }
}

//! Static weapon catalog and per-team ammo
//!
//! Each weapon class carries only the fields it uses; the tick loop matches
//! on `WeaponClass` to decide how a shot is spawned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponKind {
    Bazooka,
    Grenade,
    Shotgun,
    HolyGrenade,
    BananaBomb,
    Airstrike,
    Dynamite,
    Sniper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ammo {
    Unlimited,
    Limited(u32),
}

/// Launch behaviour shared by thrown and fired weapons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    /// Launch speed at full power (px/frame)
    pub speed: f32,
    /// Affected by wind
    pub wind: bool,
    pub bounces: u32,
    /// Seconds until detonation; 0 detonates on contact
    pub fuse_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponClass {
    /// Single projectile; optional cluster split on detonation
    Ballistic { flight: Flight, cluster: u32 },
    /// Several jittered projectiles per shot
    MultiPellet { flight: Flight, pellets: u32 },
    /// Dropped at the firer's feet
    Placement { fuse_secs: f32 },
    /// Missiles released over time from above the target
    Staged {
        missiles: u32,
        spread: f32,
        interval_secs: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: &'static str,
    pub blast_radius: f32,
    pub damage: i32,
    pub ammo: Ammo,
    pub class: WeaponClass,
}

impl Weapon {
    /// Flight profile for weapons that launch along an aim vector
    pub fn flight(&self) -> Option<&Flight> {
        match &self.class {
            WeaponClass::Ballistic { flight, .. } | WeaponClass::MultiPellet { flight, .. } => Some(flight),
            _ => None,
        }
    }

    pub fn launch_speed(&self) -> f32 {
        self.flight().map(|f| f.speed).unwrap_or(0.0)
    }

    /// Flight of the projectile this weapon puts into the world
    pub fn projectile_flight(&self) -> Flight {
        match self.class {
            WeaponClass::Ballistic { flight, .. } | WeaponClass::MultiPellet { flight, .. } => flight,
            WeaponClass::Placement { fuse_secs } => Flight {
                speed: 0.0,
                wind: false,
                bounces: 0,
                fuse_secs,
            },
            WeaponClass::Staged { .. } => MISSILE_FLIGHT,
        }
    }
}

/// Cluster bomblets: wind-sensitive, contact detonation
pub const BOMBLET_FLIGHT: Flight = Flight {
    speed: 0.0,
    wind: true,
    bounces: 0,
    fuse_secs: 0.0,
};

/// Airstrike missiles: dropped straight down, contact detonation
pub const MISSILE_FLIGHT: Flight = Flight {
    speed: 5.0,
    wind: false,
    bounces: 0,
    fuse_secs: 0.0,
};

static BAZOOKA: Weapon = Weapon {
    name: "Bazooka",
    blast_radius: 32.0,
    damage: 45,
    ammo: Ammo::Unlimited,
    class: WeaponClass::Ballistic {
        flight: Flight {
            speed: 8.0,
            wind: true,
            bounces: 0,
            fuse_secs: 0.0,
        },
        cluster: 0,
    },
};

static GRENADE: Weapon = Weapon {
    name: "Grenade",
    blast_radius: 28.0,
    damage: 40,
    ammo: Ammo::Unlimited,
    class: WeaponClass::Ballistic {
        flight: Flight {
            speed: 7.0,
            wind: false,
            bounces: 3,
            fuse_secs: 3.0,
        },
        cluster: 0,
    },
};

static SHOTGUN: Weapon = Weapon {
    name: "Shotgun",
    blast_radius: 12.0,
    damage: 25,
    ammo: Ammo::Unlimited,
    class: WeaponClass::MultiPellet {
        flight: Flight {
            speed: 12.0,
            wind: false,
            bounces: 0,
            fuse_secs: 0.0,
        },
        pellets: 2,
    },
};

static HOLY_GRENADE: Weapon = Weapon {
    name: "Holy Grenade",
    blast_radius: 65.0,
    damage: 80,
    ammo: Ammo::Limited(1),
    class: WeaponClass::Ballistic {
        flight: Flight {
            speed: 6.0,
            wind: false,
            bounces: 1,
            fuse_secs: 4.0,
        },
        cluster: 0,
    },
};

static BANANA_BOMB: Weapon = Weapon {
    name: "Banana Bomb",
    blast_radius: 24.0,
    damage: 30,
    ammo: Ammo::Limited(2),
    class: WeaponClass::Ballistic {
        flight: Flight {
            speed: 7.0,
            wind: true,
            bounces: 2,
            fuse_secs: 3.0,
        },
        cluster: 5,
    },
};

static AIRSTRIKE: Weapon = Weapon {
    name: "Airstrike",
    blast_radius: 22.0,
    damage: 35,
    ammo: Ammo::Limited(1),
    class: WeaponClass::Staged {
        missiles: 5,
        spread: 120.0,
        interval_secs: 0.12,
    },
};

static DYNAMITE: Weapon = Weapon {
    name: "Dynamite",
    blast_radius: 55.0,
    damage: 75,
    ammo: Ammo::Limited(2),
    class: WeaponClass::Placement { fuse_secs: 3.0 },
};

static SNIPER: Weapon = Weapon {
    name: "Sniper",
    blast_radius: 8.0,
    damage: 50,
    ammo: Ammo::Limited(3),
    class: WeaponClass::Ballistic {
        flight: Flight {
            speed: 25.0,
            wind: false,
            bounces: 0,
            fuse_secs: 0.0,
        },
        cluster: 0,
    },
};

impl WeaponKind {
    pub const ALL: [WeaponKind; 8] = [
        WeaponKind::Bazooka,
        WeaponKind::Grenade,
        WeaponKind::Shotgun,
        WeaponKind::HolyGrenade,
        WeaponKind::BananaBomb,
        WeaponKind::Airstrike,
        WeaponKind::Dynamite,
        WeaponKind::Sniper,
    ];

    pub fn spec(&self) -> &'static Weapon {
        match self {
            WeaponKind::Bazooka => &BAZOOKA,
            WeaponKind::Grenade => &GRENADE,
            WeaponKind::Shotgun => &SHOTGUN,
            WeaponKind::HolyGrenade => &HOLY_GRENADE,
            WeaponKind::BananaBomb => &BANANA_BOMB,
            WeaponKind::Airstrike => &AIRSTRIKE,
            WeaponKind::Dynamite => &DYNAMITE,
            WeaponKind::Sniper => &SNIPER,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            WeaponKind::Bazooka => "bazooka",
            WeaponKind::Grenade => "grenade",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::HolyGrenade => "holyGrenade",
            WeaponKind::BananaBomb => "bananaBomb",
            WeaponKind::Airstrike => "airstrike",
            WeaponKind::Dynamite => "dynamite",
            WeaponKind::Sniper => "sniper",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|w| w.key() == key)
    }
}

/// Remaining ammo for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoBelt {
    stock: BTreeMap<WeaponKind, Ammo>,
}

impl Default for AmmoBelt {
    fn default() -> Self {
        Self::full()
    }
}

impl AmmoBelt {
    /// Starting loadout from the catalog
    pub fn full() -> Self {
        Self {
            stock: WeaponKind::ALL.iter().map(|&w| (w, w.spec().ammo)).collect(),
        }
    }

    pub fn get(&self, weapon: WeaponKind) -> Ammo {
        self.stock.get(&weapon).copied().unwrap_or(Ammo::Limited(0))
    }

    pub fn available(&self, weapon: WeaponKind) -> bool {
        match self.get(weapon) {
            Ammo::Unlimited => true,
            Ammo::Limited(n) => n > 0,
        }
    }

    /// Spend one shot; false if none are left
    pub fn consume(&mut self, weapon: WeaponKind) -> bool {
        match self.stock.get_mut(&weapon) {
            Some(Ammo::Unlimited) => true,
            Some(Ammo::Limited(n)) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponKind, Ammo)> + '_ {
        self.stock.iter().map(|(&k, &a)| (k, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keys() {
        for w in WeaponKind::ALL {
            assert_eq!(WeaponKind::from_key(w.key()), Some(w));
            assert_eq!(serde_json::to_string(&w).unwrap(), format!("\"{}\"", w.key()));
        }
    }

    #[test]
    fn test_catalog_values() {
        let b = WeaponKind::Bazooka.spec();
        assert_eq!((b.blast_radius, b.damage), (32.0, 45));
        assert_eq!(b.launch_speed(), 8.0);
        assert!(b.flight().unwrap().wind);

        let g = WeaponKind::Grenade.spec();
        assert_eq!(g.flight().unwrap().bounces, 3);
        assert_eq!(g.flight().unwrap().fuse_secs, 3.0);

        assert!(matches!(
            WeaponKind::BananaBomb.spec().class,
            WeaponClass::Ballistic { cluster: 5, .. }
        ));
        assert!(matches!(
            WeaponKind::Shotgun.spec().class,
            WeaponClass::MultiPellet { pellets: 2, .. }
        ));
        assert!(matches!(
            WeaponKind::Airstrike.spec().class,
            WeaponClass::Staged { missiles: 5, .. }
        ));
        assert!(WeaponKind::Dynamite.spec().flight().is_none());
        assert_eq!(WeaponKind::Dynamite.spec().projectile_flight().fuse_secs, 3.0);
        assert_eq!(WeaponKind::Airstrike.spec().projectile_flight(), MISSILE_FLIGHT);
        assert_eq!(WeaponKind::Sniper.spec().launch_speed(), 25.0);
    }

    #[test]
    fn test_ammo_gating() {
        let mut belt = AmmoBelt::full();
        assert!(belt.consume(WeaponKind::HolyGrenade));
        assert!(!belt.available(WeaponKind::HolyGrenade));
        assert!(!belt.consume(WeaponKind::HolyGrenade));
        assert_eq!(belt.get(WeaponKind::HolyGrenade), Ammo::Limited(0));

        for _ in 0..100 {
            assert!(belt.consume(WeaponKind::Bazooka));
        }
        assert_eq!(belt.get(WeaponKind::Bazooka), Ammo::Unlimited);
        assert_eq!(belt.get(WeaponKind::Sniper), Ammo::Limited(3));
    }
}

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Instant;

use glam::Vec3;
use log::{debug, error, info, warn};
use sacn::source::SacnSource;

use crate::model::NetworkConfig;

/// Publishes the effective ambient color over sACN (E1.31) once per frame.
/// The three channels of the configured universe carry R, G, B.
pub struct AmbienceOutput {
    sender: SacnSource,
    registered_universes: HashSet<u16>,
    network: NetworkConfig,
}

impl AmbienceOutput {
    /// Bring up the sACN sender. Returns None when the network stack is
    /// unavailable; the app keeps running with output disabled.
    pub fn new(network: NetworkConfig) -> Option<Self> {
        info!("[OUTPUT] Initializing sACN (E1.31) network stack...");

        let local_addr = SocketAddr::from(([0, 0, 0, 0], 0));
        debug!("[OUTPUT] Binding to address: {}", local_addr);

        let sender = match SacnSource::with_ip("AmbientLightAdjustment", local_addr) {
            Ok(sender) => sender,
            Err(e) => {
                error!("[OUTPUT] Failed to create sACN sender: {:?}", e);
                warn!("[OUTPUT] Continuing with lighting output disabled");
                return None;
            }
        };

        info!("[OUTPUT] sACN sender ready on universe {}", network.universe);
        Some(Self {
            sender,
            registered_universes: HashSet::new(),
            network,
        })
    }

    /// Write the color into the first three channels of the universe.
    /// Channels beyond the RGB triple are left untouched at zero.
    pub fn publish(&mut self, color: Vec3) {
        let u = self.network.universe.clamp(1, 63999);
        if !self.registered_universes.contains(&u) {
            match self.sender.register_universe(u) {
                Ok(_) => {
                    self.registered_universes.insert(u);
                    info!("[OUTPUT] Registered sACN Universe {}", u);
                }
                Err(e) => {
                    error!("[OUTPUT] Failed to register sACN Universe {}: {:?}", u, e);
                    return;
                }
            }
        }

        let dst_ip: Option<SocketAddr> = if self.network.use_multicast {
            None
        } else {
            match self.network.unicast_ip.parse::<std::net::IpAddr>() {
                Ok(ip) => Some(SocketAddr::new(ip, 5568)),
                Err(_) => {
                    warn!("[OUTPUT] Invalid unicast IP {:?}, skipping send", self.network.unicast_ip);
                    return;
                }
            }
        };

        let mut frame = vec![0u8]; // Start Code
        frame.extend_from_slice(&[
            channel_value(color.x),
            channel_value(color.y),
            channel_value(color.z),
        ]);

        if let Err(e) = self.sender.send(&[u], &frame, Some(100), dst_ip, None) {
            warn!("[OUTPUT] sACN send error on Universe {} (Dest: {:?}): {:?}", u, dst_ip, e);
        }
    }
}

fn channel_value(intensity: f32) -> u8 {
    (intensity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Stand-in for the host scene's ambient rig: a warm base color with a slow
/// periodic drift, so follow-default mode visibly tracks a moving default.
pub struct EnvironmentAmbience {
    start: Instant,
    base: Vec3,
}

/// Full drift cycle length in seconds.
const DRIFT_PERIOD: f32 = 120.0;

impl EnvironmentAmbience {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            base: Vec3::new(0.42, 0.40, 0.36),
        }
    }

    pub fn sample(&self, now: Instant) -> Vec3 {
        let t = now.duration_since(self.start).as_secs_f32();
        let phase = t * std::f32::consts::TAU / DRIFT_PERIOD;
        let drift = 0.8 + 0.2 * phase.sin();
        (self.base * drift).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

//! Fixed-window request limiting per client IP.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Window {
    started: Instant,
    hits: u32,
}

pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self { window, max_requests, clients: DashMap::new() }
    }

    /// Counts one request. `Err` carries the time until the window resets.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut entry = self.clients.entry(ip).or_insert(Window { started: now, hits: 0 });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.hits = 0;
        }
        if entry.hits >= self.max_requests {
            let elapsed = now.saturating_duration_since(entry.started);
            return Err(self.window.saturating_sub(elapsed));
        }
        entry.hits += 1;
        Ok(())
    }

    /// Forgets clients whose window has expired.
    pub fn prune(&self) {
        let now = Instant::now();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4));

    #[test]
    fn blocks_after_max_requests_within_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        let t0 = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at(IP, t0).is_ok());
        }
        let retry = limiter.check_at(IP, t0 + Duration::from_secs(20)).unwrap_err();
        assert_eq!(retry, Duration::from_secs(40));
    }

    #[test]
    fn window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let t0 = Instant::now();
        assert!(limiter.check_at(IP, t0).is_ok());
        assert!(limiter.check_at(IP, t0 + Duration::from_secs(1)).is_err());
        assert!(limiter.check_at(IP, t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn clients_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let t0 = Instant::now();
        assert!(limiter.check_at(IP, t0).is_ok());
        assert!(limiter.check_at(IpAddr::V4(Ipv4Addr::LOCALHOST), t0).is_ok());
        assert_eq!(limiter.tracked_clients(), 2);
    }
}

use chrono::Local;
use tracing::*;

use super::{
    types::{Page, ViewportBudget},
    wrap::wrap,
};
use crate::metrics::types::{Snapshot, SystemMetrics};

pub const VERSION_TITLE: &str = "Pi-hole version";
pub const STATS_TITLE: &str = "Pi-hole stats";
pub const SYSTEM_TITLE: &str = "System";

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;
const NOT_AVAILABLE: &str = "n/a";

/// Turns a [`Snapshot`] into pages, always in version, stats, system order.
#[derive(Debug, Clone, Copy)]
pub struct PageComposer {
    viewport: ViewportBudget,
}

impl PageComposer {
    pub fn new(viewport: ViewportBudget) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> ViewportBudget {
        self.viewport
    }

    #[instrument(level = "debug", skip_all)]
    pub fn compose(&self, snapshot: &Snapshot) -> Vec<Page> {
        let sections = [
            (VERSION_TITLE, snapshot.version.clone()),
            (STATS_TITLE, snapshot.blocking_stats.clone()),
            (SYSTEM_TITLE, system_section(snapshot)),
        ];

        let pages: Vec<Page> = sections
            .iter()
            .flat_map(|(title, text)| paginate(title, text, &self.viewport))
            .collect();

        debug!(
            "Composed {} pages for a {}x{} viewport",
            pages.len(),
            self.viewport.width_chars(),
            self.viewport.height_chars()
        );

        pages
    }
}

pub fn compose(snapshot: &Snapshot, viewport: ViewportBudget) -> Vec<Page> {
    PageComposer::new(viewport).compose(snapshot)
}

fn paginate(title: &str, text: &str, viewport: &ViewportBudget) -> Vec<Page> {
    let lines = wrap(text, viewport.width_chars());
    if lines.is_empty() {
        return vec![Page::new(title, String::new(), 0, 1)];
    }

    let chunks: Vec<&[String]> = lines.chunks(viewport.height_chars()).collect();
    let parts = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(part, chunk)| Page::new(title, chunk.join("\n"), part, parts))
        .collect()
}

fn system_section(snapshot: &Snapshot) -> String {
    let SystemMetrics {
        load_average,
        cpu_percent_per_core,
        memory,
        disk_usage,
        temperatures,
        boot_time,
    } = &snapshot.system;

    let mut lines = vec![format!(
        "Updated {}",
        snapshot.collected_at.format("%Y-%m-%d %H:%M")
    )];

    lines.push(match load_average {
        Some(load) => format!("Load {:.2} {:.2} {:.2}", load.one, load.five, load.fifteen),
        None => format!("Load {NOT_AVAILABLE}"),
    });

    lines.push(match cpu_percent_per_core {
        Some(cores) => format!(
            "CPU {}",
            cores
                .iter()
                .map(|usage| format!("{usage:.0}%"))
                .collect::<Vec<String>>()
                .join(" ")
        ),
        None => format!("CPU {NOT_AVAILABLE}"),
    });

    lines.push(match memory {
        Some(memory) => format!(
            "Mem {:.0}/{:.0} MiB ({:.0}%)",
            memory.used_bytes as f64 / MIB,
            memory.total_bytes as f64 / MIB,
            memory.used_percent()
        ),
        None => format!("Mem {NOT_AVAILABLE}"),
    });

    lines.push(match disk_usage {
        Some(disk) => format!(
            "Disk {} {:.1}/{:.1} GiB ({:.0}%)",
            disk.mount_point,
            disk.used_bytes as f64 / GIB,
            disk.total_bytes as f64 / GIB,
            disk.used_percent()
        ),
        None => format!("Disk {NOT_AVAILABLE}"),
    });

    match temperatures {
        Some(sensors) if sensors.is_empty() => lines.push("Temp no sensors".to_string()),
        Some(sensors) => lines.extend(
            sensors
                .iter()
                .map(|(name, celsius)| format!("Temp {name} {celsius:.1}C")),
        ),
        None => lines.push(format!("Temp {NOT_AVAILABLE}")),
    }

    lines.push(match boot_time {
        Some(boot_time) => format!(
            "Up since {}",
            boot_time.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => format!("Up since {NOT_AVAILABLE}"),
    });

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::metrics::types::{DiskUsage, LoadAverage, MemoryUsage};

    fn viewport(width: usize, height: usize) -> ViewportBudget {
        ViewportBudget::new(width, height).unwrap()
    }

    fn full_metrics() -> SystemMetrics {
        SystemMetrics {
            load_average: Some(LoadAverage {
                one: 0.52,
                five: 0.48,
                fifteen: 0.41,
            }),
            cpu_percent_per_core: Some(vec![12.0, 3.4, 5.6, 80.1]),
            memory: Some(MemoryUsage {
                total_bytes: 4 * 1024 * 1024 * 1024,
                used_bytes: 412 * 1024 * 1024,
                available_bytes: 3684 * 1024 * 1024,
            }),
            disk_usage: Some(DiskUsage {
                mount_point: "/".into(),
                total_bytes: 29 * 1024 * 1024 * 1024,
                used_bytes: 5 * 1024 * 1024 * 1024,
                available_bytes: 24 * 1024 * 1024 * 1024,
            }),
            temperatures: Some(BTreeMap::from([
                ("cpu_thermal".to_string(), 48.3),
                ("rp1_adc_temp_with_a_really_long_label".to_string(), 51.0),
            ])),
            boot_time: Some(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()),
        }
    }

    fn snapshot(version: &str, blocking_stats: &str, system: SystemMetrics) -> Snapshot {
        Snapshot {
            version: version.to_string(),
            blocking_stats: blocking_stats.to_string(),
            system,
            collected_at: Local.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap(),
        }
    }

    fn stats_text() -> &'static str {
        concat!(
            "domains_being_blocked 116007\n",
            "dns_queries_today 30163\n",
            "ads_blocked_today 5650\n",
            "ads_percentage_today 18.731558\n",
            "unique_domains 1056\n",
            "queries_forwarded 4275\n",
            "queries_cached 20238\n",
            "clients_ever_seen 11\n",
            "unique_clients 9\n",
            "status enabled"
        )
    }

    #[test]
    fn pages_respect_every_viewport() {
        let token = "x".repeat(97);
        let snapshots = [
            snapshot("FTL v5.1", stats_text(), full_metrics()),
            snapshot("", "", SystemMetrics::default()),
            snapshot(&token, &format!("{token} {token}\n\n{token}"), full_metrics()),
        ];
        let viewports = [(1, 1), (3, 2), (20, 4), (31, 11), (35, 13), (200, 50)];

        for snapshot in &snapshots {
            for (width, height) in viewports {
                let viewport = viewport(width, height);
                for page in compose(snapshot, viewport) {
                    assert!(page.fits(&viewport), "{page:?} overflows {width}x{height}");
                    assert!(page.lines().count() <= height);
                    assert!(page.lines().all(|line| line.chars().count() <= width));
                }
            }
        }
    }

    #[test]
    fn composition_is_deterministic() {
        let snapshot = snapshot("FTL v5.1", stats_text(), full_metrics());
        let composer = PageComposer::new(viewport(20, 4));

        assert_eq!(composer.compose(&snapshot), composer.compose(&snapshot));
    }

    #[test]
    fn ninety_character_stats_line_splits_into_two_pages() {
        let stats = "ads_blocked_today 5650 dns_queries_today 30163 ads_percentage_today 18.7315 status enabled";
        assert_eq!(stats.len(), 90);

        let pages = compose(
            &snapshot("FTL v5.1", stats, SystemMetrics::default()),
            viewport(20, 4),
        );
        let stats_pages: Vec<&Page> = pages
            .iter()
            .filter(|page| page.title == STATS_TITLE)
            .collect();

        assert_eq!(stats_pages.len(), 2);
        assert_eq!(stats_pages[0].title, stats_pages[1].title);
        assert_eq!(stats_pages[0].parts, 2);
        assert!(!stats_pages[0].is_continuation());
        assert!(stats_pages[1].is_continuation());

        for page in &stats_pages {
            assert!(page.lines().count() <= 4);
            assert!(page.lines().all(|line| line.len() <= 20));
        }

        let rejoined = stats_pages
            .iter()
            .flat_map(|page| page.lines())
            .collect::<Vec<&str>>()
            .join(" ");
        assert_eq!(rejoined, stats);
    }

    #[test]
    fn sections_keep_their_order() {
        let pages = compose(
            &snapshot("FTL v5.1", stats_text(), full_metrics()),
            viewport(20, 3),
        );

        let titles: Vec<&str> = pages.iter().map(|page| page.title.as_str()).collect();
        let first_stats = titles.iter().position(|title| *title == STATS_TITLE).unwrap();
        let first_system = titles.iter().position(|title| *title == SYSTEM_TITLE).unwrap();

        assert_eq!(titles[0], VERSION_TITLE);
        assert!(titles[..first_stats].iter().all(|title| *title == VERSION_TITLE));
        assert!(titles[first_stats..first_system]
            .iter()
            .all(|title| *title == STATS_TITLE));
        assert!(titles[first_system..].iter().all(|title| *title == SYSTEM_TITLE));
    }

    #[test]
    fn split_pages_preserve_line_order() {
        let pages = compose(
            &snapshot("FTL v5.1", stats_text(), full_metrics()),
            viewport(40, 3),
        );

        let stats_lines: Vec<&str> = pages
            .iter()
            .filter(|page| page.title == STATS_TITLE)
            .flat_map(|page| page.lines())
            .collect();
        assert_eq!(stats_lines, stats_text().lines().collect::<Vec<&str>>());
    }

    #[test]
    fn empty_sections_still_get_a_page() {
        let pages = compose(&snapshot("", "  \n", full_metrics()), viewport(35, 13));

        assert_eq!(pages[0].title, VERSION_TITLE);
        assert!(pages[0].body.is_empty());
        assert_eq!(pages[1].title, STATS_TITLE);
        assert!(pages[1].body.is_empty());
    }

    #[test]
    fn absent_metrics_render_as_not_available() {
        let pages = compose(&snapshot("v", "s", SystemMetrics::default()), viewport(35, 13));
        let system = &pages[2];

        assert_eq!(system.title, SYSTEM_TITLE);
        for label in ["Load", "CPU", "Mem", "Disk", "Temp", "Up since"] {
            assert!(
                system.body.contains(&format!("{label} n/a")),
                "missing {label} in {:?}",
                system.body
            );
        }
    }

    #[test]
    fn system_page_lists_every_metric() {
        let pages = compose(&snapshot("v", "s", full_metrics()), viewport(60, 20));
        let body = &pages[2].body;

        assert!(body.contains("Load 0.52 0.48 0.41"));
        assert!(body.contains("CPU 12% 3% 6% 80%"));
        assert!(body.contains("Mem 412/4096 MiB (10%)"));
        assert!(body.contains("Disk / 5.0/29.0 GiB (17%)"));
        assert!(body.contains("Temp cpu_thermal 48.3C"));
        assert!(body.contains("Up since"));
        assert!(!body.contains("n/a"));
    }
}

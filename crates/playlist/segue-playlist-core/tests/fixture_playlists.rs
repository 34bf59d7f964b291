use segue_playlist::{Config, MemoryMixer, PlaybackScheduler};
use segue_test_fixtures::{clip_tables, playlists};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn run_playlist(name: &str) {
    let playlist = playlists::load(name).unwrap();
    let table = playlist.clip_table().unwrap();
    let mut s = PlaybackScheduler::with_audio(
        Config::default(),
        MemoryMixer::new(table.durations.clone()),
        MemoryMixer::with_inputs(table.audio_inputs),
    );
    for step in &playlist.appends {
        s.append(&step.animations, step.audios.as_deref(), step.queued)
            .unwrap_or_else(|e| panic!("{name}: append failed: {e}"));
    }

    for frame in 1..=playlist.frames() {
        s.tick(playlist.delta);
        for exp in playlist.expect.iter().filter(|e| e.after_ticks == frame) {
            if let Some(queue) = &exp.queue {
                let actual: Vec<usize> = s.units().map(|u| u.animation_index()).collect();
                assert_eq!(&actual, queue, "{name}: queue after {frame} ticks");
            }
            for (&index, &weight) in &exp.weights {
                let actual = s.animation_mixer().weight(index).unwrap();
                approx(actual, weight, 1e-5);
            }
        }
    }
}

#[test]
fn two_clip_crossfade() {
    run_playlist("two-clip-crossfade");
}

#[test]
fn replace_pending() {
    run_playlist("replace-pending");
}

#[test]
fn short_clips() {
    run_playlist("short-clips");
}

#[test]
fn every_fixture_playlist_keeps_weights_in_range() {
    for name in playlists::keys() {
        let playlist = playlists::load(&name).unwrap();
        let table = playlist.clip_table().unwrap();
        let mut s = PlaybackScheduler::new(Config::default(), MemoryMixer::new(table.durations));
        for step in &playlist.appends {
            s.append(&step.animations, step.audios.as_deref(), step.queued)
                .unwrap();
        }
        for _ in 0..200 {
            s.tick(playlist.delta);
        }
        for &(_, w) in s.animation_mixer().writes() {
            assert!((0.0..=1.0).contains(&w), "{name}: weight {w} out of range");
        }
    }
}

#[test]
fn sum_of_weights_never_exceeds_two_inputs() {
    let table = clip_tables::load("basic").unwrap();
    let mut s = PlaybackScheduler::new(Config::default(), MemoryMixer::new(table.durations));
    s.append(&[0, 1, 2, 3, 4, 5], None, true).unwrap();
    for _ in 0..100 {
        s.tick(1.0 / 60.0);
        let active = s
            .animation_mixer()
            .weights()
            .iter()
            .filter(|w| **w > 0.0)
            .count();
        assert!(active <= 2, "{active} inputs carry weight");
        let sum: f32 = s.animation_mixer().weights().iter().sum();
        assert!(sum <= 2.0);
    }
}

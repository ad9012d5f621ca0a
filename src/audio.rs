//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no sound files to preload.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::error::{GameError, Result};
use crate::presenter::SoundEffect;
use crate::settings::Settings;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Master * sfx volume, zero when muted
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - game will continue without sound");
        }
        Self {
            ctx,
            volume: settings.effective_volume(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) -> Result<()> {
        let vol = self.volume;
        if vol <= 0.0 {
            return Ok(());
        }

        let Some(ctx) = &self.ctx else {
            return Err(GameError::Sink("no audio context".into()));
        };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Start => self.play_start(ctx, vol),
            SoundEffect::Collect => self.play_collect(ctx, vol),
            SoundEffect::Miss => self.play_miss(ctx, vol),
            SoundEffect::Storm => self.play_storm(ctx, vol),
            SoundEffect::Milestone => self.play_milestone(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Result<(OscillatorNode, GainNode)> {
        let node_err = |_| GameError::Sink("failed to build audio node".into());
        let osc = ctx.create_oscillator().map_err(node_err)?;
        let gain = ctx.create_gain().map_err(node_err)?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).map_err(node_err)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(node_err)?;

        Ok((osc, gain))
    }

    /// One enveloped tone gliding from `from` to `to` Hz, starting `delay` seconds from now
    #[allow(clippy::too_many_arguments)]
    fn glide(
        &self,
        ctx: &AudioContext,
        osc_type: OscillatorType,
        from: f32,
        to: f32,
        level: f32,
        delay: f64,
        duration: f64,
    ) -> Result<()> {
        let (osc, gain) = self.create_osc(ctx, from, osc_type)?;
        let t = ctx.current_time() + delay;

        gain.gain().set_value_at_time(0.01, ctx.current_time()).ok();
        gain.gain().set_value_at_time(level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + duration)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        if (to - from).abs() > f32::EPSILON {
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + duration)
                .ok();
        }

        osc.start().ok();
        osc.stop_with_when(t + duration + 0.05).ok();
        Ok(())
    }

    /// Round start - two rising notes
    fn play_start(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        self.glide(ctx, OscillatorType::Triangle, 440.0, 440.0, vol * 0.3, 0.0, 0.12)?;
        self.glide(ctx, OscillatorType::Triangle, 660.0, 660.0, vol * 0.3, 0.12, 0.2)
    }

    /// Clean water - bright rising bloop
    fn play_collect(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        self.glide(ctx, OscillatorType::Sine, 500.0, 1200.0, vol * 0.4, 0.0, 0.12)?;
        // Sparkle on top
        self.glide(ctx, OscillatorType::Sine, 1800.0, 2400.0, vol * 0.12, 0.04, 0.08)
    }

    /// Dirty water or missed clean water - dull falling tone
    fn play_miss(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        self.glide(ctx, OscillatorType::Triangle, 300.0, 120.0, vol * 0.35, 0.0, 0.25)
    }

    /// Storm cloud - low rumble with a thunder crack
    fn play_storm(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        self.glide(ctx, OscillatorType::Sawtooth, 90.0, 35.0, vol * 0.45, 0.0, 0.5)?;
        self.glide(ctx, OscillatorType::Square, 1500.0, 400.0, vol * 0.15, 0.0, 0.1)
    }

    /// Milestone - rising arpeggio
    fn play_milestone(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        let notes = [523.25, 659.25, 783.99, 1046.5]; // C5, E5, G5, C6
        for (i, &freq) in notes.iter().enumerate() {
            self.glide(
                ctx,
                OscillatorType::Sine,
                freq,
                freq,
                vol * 0.25,
                i as f64 * 0.1,
                0.2,
            )?;
        }
        Ok(())
    }

    /// Game over - slow descending notes
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) -> Result<()> {
        let notes = [392.0, 329.63, 261.63]; // G4, E4, C4
        for (i, &freq) in notes.iter().enumerate() {
            self.glide(
                ctx,
                OscillatorType::Triangle,
                freq,
                freq * 0.98,
                vol * 0.3,
                i as f64 * 0.25,
                0.35,
            )?;
        }
        Ok(())
    }
}

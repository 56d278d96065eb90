//! A running LV2 plugin behind the core's region model.

use lilv::instance::{ActiveInstance, Instance};
use porthost_core::{PluginInstance, PortIo, PortRegion};

use crate::urid::UridMap;

/// Frames the plugin sees per `run` call. Longer host blocks are processed
/// in chunks of this size.
pub const SCRATCH_FRAMES: usize = 8192;

enum State {
    Inactive(Instance),
    Active(ActiveInstance),
    Released,
}

/// An instantiated LV2 plugin.
///
/// Every connected port points into storage owned by this value: one control
/// slot per port and one scratch buffer per audio port, allocated when the
/// port is connected. `run` copies the host's regions in, runs the plugin and
/// copies outputs back.
pub struct Lv2Instance {
    // Declared before `_urid` so the plugin is freed before its feature data.
    state: State,
    regions: Vec<PortRegion>,
    controls: Box<[f32]>,
    audio: Vec<Box<[f32]>>,
    _urid: UridMap,
}

impl Lv2Instance {
    pub(crate) fn new(instance: Instance, port_count: usize, urid: UridMap) -> Self {
        Self {
            state: State::Inactive(instance),
            regions: vec![PortRegion::Unbound; port_count],
            controls: vec![0.0; port_count].into_boxed_slice(),
            audio: vec![Box::default(); port_count],
            _urid: urid,
        }
    }

    fn instance_mut(&mut self) -> Option<&mut Instance> {
        match &mut self.state {
            State::Inactive(instance) => Some(instance),
            State::Active(active) => Some(active.instance_mut()),
            State::Released => None,
        }
    }
}

impl PluginInstance for Lv2Instance {
    #[allow(unsafe_code)]
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        let port = index as usize;
        if port >= self.regions.len() {
            return;
        }
        self.regions[port] = region;

        let data: *mut f32 = match region {
            PortRegion::Control(_) => std::ptr::from_mut(&mut self.controls[port]),
            PortRegion::AudioIn(_) | PortRegion::AudioOut(_) => {
                if self.audio[port].is_empty() {
                    self.audio[port] = vec![0.0; SCRATCH_FRAMES].into_boxed_slice();
                }
                self.audio[port].as_mut_ptr()
            }
            PortRegion::Unbound => std::ptr::null_mut(),
        };
        if let Some(instance) = self.instance_mut() {
            // SAFETY: `data` is null or points into a boxed slice owned by
            // `self` that is never reallocated while the instance lives.
            unsafe { instance.connect_port_mut(port, data) };
        }
    }

    #[allow(unsafe_code)]
    fn activate(&mut self) {
        if let State::Inactive(instance) = std::mem::replace(&mut self.state, State::Released) {
            // SAFETY: every port was connected by the binder beforehand.
            self.state = State::Active(unsafe { instance.activate() });
        }
    }

    #[allow(unsafe_code)]
    fn run(&mut self, io: &mut PortIo<'_>) {
        let State::Active(instance) = &mut self.state else {
            return;
        };
        let frames = io.frames();
        let mut offset = 0;
        while offset < frames {
            let n = (frames - offset).min(SCRATCH_FRAMES);

            for (port, &region) in self.regions.iter().enumerate() {
                match region {
                    PortRegion::Control(_) => self.controls[port] = io.control(region),
                    PortRegion::AudioIn(_) => {
                        let scratch = &mut self.audio[port][..n];
                        match io.input(region).get(offset..offset + n) {
                            Some(src) => scratch.copy_from_slice(src),
                            None => scratch.fill(0.0),
                        }
                    }
                    PortRegion::AudioOut(_) | PortRegion::Unbound => {}
                }
            }

            // SAFETY: the instance is active and every connected buffer holds
            // at least `n` frames.
            unsafe { instance.run(n) };

            for (port, &region) in self.regions.iter().enumerate() {
                match region {
                    PortRegion::Control(_) => io.set_control(region, self.controls[port]),
                    PortRegion::AudioOut(_) => {
                        if let Some(dst) = io.output(region).get_mut(offset..offset + n) {
                            dst.copy_from_slice(&self.audio[port][..n]);
                        }
                    }
                    PortRegion::AudioIn(_) | PortRegion::Unbound => {}
                }
            }
            offset += n;
        }
    }

    #[allow(unsafe_code)]
    fn deactivate(&mut self) {
        if let State::Active(active) = std::mem::replace(&mut self.state, State::Released) {
            // SAFETY: called once, after the last `run`.
            drop(unsafe { active.deactivate() });
        }
    }
}

impl Drop for Lv2Instance {
    fn drop(&mut self) {
        if matches!(self.state, State::Active(_)) {
            tracing::debug!("deactivating LV2 instance dropped while active");
            self.deactivate();
        }
    }
}

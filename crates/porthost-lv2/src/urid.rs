//! The `urid:map` host feature.
//!
//! Most plugins that speak atoms or MIDI refuse to instantiate without it.
//! URIs are numbered from 1 in the order they are first asked for.

use std::collections::HashMap;
use std::ffi::{CStr, c_char, c_void};
use std::sync::Mutex;

use lv2_raw::{LV2Feature, LV2Urid, LV2UridMap, LV2UridMapHandle};

const URID_MAP_URI: &CStr = c"http://lv2plug.in/ns/ext/urid#map";

#[derive(Default)]
struct UridTable {
    ids: HashMap<String, LV2Urid>,
}

impl UridTable {
    fn id(&mut self, uri: &str) -> LV2Urid {
        let next = self.ids.len() as LV2Urid + 1;
        *self.ids.entry(uri.to_owned()).or_insert(next)
    }
}

/// Feature data handed to one plugin instance.
///
/// The map and its table are boxed so the addresses given to the plugin stay
/// valid when this value moves.
pub(crate) struct UridMap {
    feature: LV2Feature,
    _map: Box<LV2UridMap>,
    _table: Box<Mutex<UridTable>>,
}

impl UridMap {
    pub(crate) fn new() -> Self {
        let table = Box::new(Mutex::new(UridTable::default()));
        let mut map = Box::new(LV2UridMap {
            handle: std::ptr::from_ref::<Mutex<UridTable>>(&*table)
                .cast_mut()
                .cast::<c_void>(),
            map: map_uri,
        });
        let feature = LV2Feature {
            uri: URID_MAP_URI.as_ptr(),
            data: std::ptr::from_mut::<LV2UridMap>(&mut *map).cast::<c_void>(),
        };
        Self {
            feature,
            _map: map,
            _table: table,
        }
    }

    pub(crate) fn feature(&self) -> &LV2Feature {
        &self.feature
    }

    #[cfg(test)]
    fn id(&self, uri: &CStr) -> LV2Urid {
        (self._map.map)(self._map.handle, uri.as_ptr())
    }
}

#[allow(unsafe_code)]
extern "C" fn map_uri(handle: LV2UridMapHandle, uri: *const c_char) -> LV2Urid {
    if handle.is_null() || uri.is_null() {
        return 0;
    }
    // SAFETY: `uri` is a NUL-terminated string owned by the caller for the
    // duration of the call, and `handle` is the boxed table set up in
    // `UridMap::new`, alive for as long as the instance using it.
    let (uri, table) = unsafe {
        (
            CStr::from_ptr(uri),
            &*handle.cast_const().cast::<Mutex<UridTable>>(),
        )
    };
    let (Ok(uri), Ok(mut table)) = (uri.to_str(), table.lock()) else {
        return 0;
    };
    table.id(uri)
}

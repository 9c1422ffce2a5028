//! PROJ objects - CRSs, datums, ellipsoids, coordinate systems, operations

use crate::context::Context;
use crate::error::{Error, Result};
use crate::types::{
    AreaOfUse, AxisInfo, Comparison, CsType, EllipsoidParameters, ObjectType,
    PrimeMeridianParameters,
};
use proj_sys as ffi;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Owned PROJ object (`PJ*`)
///
/// The object keeps its [`Context`] alive and destroys the native handle when
/// dropped.
///
/// # Example
///
/// ```rust,ignore
/// use topo_proj::Context;
///
/// let ctx = Context::new()?;
/// let crs = ctx.create_from_database("EPSG", "28992")?;
/// assert_eq!(crs.name().as_deref(), Some("Amersfoort / RD New"));
/// let ellipsoid = crs.ellipsoid().expect("projected CRS has an ellipsoid");
/// println!("{:?}", ellipsoid.ellipsoid_parameters()?);
/// ```
pub struct Object {
    handle: *mut ffi::PJ,
    ctx: Context,
}

impl Context {
    /// Create an object from any PROJ-accepted definition
    /// (PROJ string, WKT, PROJJSON, `AUTH:CODE`, object name)
    pub fn create(&self, definition: &str) -> Result<Object> {
        let c_def = to_c_string(definition, "Definition")?;
        let handle = unsafe { ffi::proj_create(self.as_ptr(), c_def.as_ptr()) };
        Object::wrap(self, handle, "proj_create")
    }

    /// Create an object from a WKT string
    pub fn create_from_wkt(&self, wkt: &str) -> Result<Object> {
        let c_wkt = to_c_string(wkt, "WKT")?;
        let handle = unsafe {
            ffi::proj_create_from_wkt(
                self.as_ptr(),
                c_wkt.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        Object::wrap(self, handle, "proj_create_from_wkt")
    }

    /// Instantiate a CRS from the PROJ database by authority and code
    pub fn create_from_database(&self, authority: &str, code: &str) -> Result<Object> {
        let c_auth = to_c_string(authority, "Authority")?;
        let c_code = to_c_string(code, "Code")?;
        let handle = unsafe {
            ffi::proj_create_from_database(
                self.as_ptr(),
                c_auth.as_ptr(),
                c_code.as_ptr(),
                ffi::PJ_CATEGORY_PJ_CATEGORY_CRS,
                0,
                ptr::null(),
            )
        };
        Object::wrap(self, handle, "proj_create_from_database")
    }

    /// Create the operation transforming coordinates from `source` to `target`
    pub fn create_crs_to_crs(&self, source: &Object, target: &Object) -> Result<Object> {
        let handle = unsafe {
            ffi::proj_create_crs_to_crs_from_pj(
                self.as_ptr(),
                source.handle,
                target.handle,
                ptr::null_mut(),
                ptr::null(),
            )
        };
        Object::wrap(self, handle, "proj_create_crs_to_crs_from_pj")
    }
}

impl Object {
    fn wrap(ctx: &Context, handle: *mut ffi::PJ, what: &str) -> Result<Self> {
        if handle.is_null() {
            Err(ctx.last_error(what))
        } else {
            Ok(Self {
                handle,
                ctx: ctx.clone(),
            })
        }
    }

    /// Wrap a handle that may legitimately be null (absent sub-object)
    fn wrap_optional(&self, handle: *mut ffi::PJ) -> Option<Object> {
        if handle.is_null() {
            None
        } else {
            Some(Object {
                handle,
                ctx: self.ctx.clone(),
            })
        }
    }

    /// The context this object was created in
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Get the raw FFI handle (for internal use)
    pub(crate) fn as_ptr(&self) -> *mut ffi::PJ {
        self.handle
    }

    /// Object name
    pub fn name(&self) -> Option<String> {
        unsafe { opt_string(ffi::proj_get_name(self.handle)) }
    }

    /// Object type
    pub fn object_type(&self) -> ObjectType {
        unsafe { ffi::proj_get_type(self.handle) }.into()
    }

    /// Whether the object is deprecated in its authority's registry
    pub fn is_deprecated(&self) -> bool {
        unsafe { ffi::proj_is_deprecated(self.handle) != 0 }
    }

    /// Scope of the first usage domain
    pub fn scope(&self) -> Option<String> {
        unsafe { opt_string(ffi::proj_get_scope(self.handle)) }
    }

    /// Name of the celestial body of the datum (e.g. `Earth`)
    pub fn celestial_body_name(&self) -> Option<String> {
        unsafe {
            opt_string(ffi::proj_get_celestial_body_name(
                self.ctx.as_ptr(),
                self.handle,
            ))
        }
    }

    /// Identifiers as `(authority, code)` pairs
    pub fn identifiers(&self) -> Vec<(String, String)> {
        let mut ids = Vec::new();
        let mut index: c_int = 0;
        loop {
            let auth = unsafe { opt_string(ffi::proj_get_id_auth_name(self.handle, index)) };
            let code = unsafe { opt_string(ffi::proj_get_id_code(self.handle, index)) };
            match (auth, code) {
                (Some(auth), Some(code)) => ids.push((auth, code)),
                _ => break,
            }
            index += 1;
        }
        ids
    }

    /// Area of use, if the object carries one
    pub fn area_of_use(&self) -> Option<AreaOfUse> {
        let (mut west, mut south, mut east, mut north) = (0.0, 0.0, 0.0, 0.0);
        let mut name: *const c_char = ptr::null();
        let ok = unsafe {
            ffi::proj_get_area_of_use(
                self.ctx.as_ptr(),
                self.handle,
                &mut west,
                &mut south,
                &mut east,
                &mut north,
                &mut name,
            )
        };
        if ok == 0 {
            return None;
        }
        Some(AreaOfUse {
            name: unsafe { opt_string(name) },
            west,
            south,
            east,
            north,
        })
    }

    /// Coordinate system of a CRS
    pub fn coordinate_system(&self) -> Option<Object> {
        let handle =
            unsafe { ffi::proj_crs_get_coordinate_system(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Type of a coordinate system object
    pub fn cs_type(&self) -> CsType {
        unsafe { ffi::proj_cs_get_type(self.ctx.as_ptr(), self.handle) }.into()
    }

    /// Number of axes of a coordinate system object
    pub fn cs_axis_count(&self) -> Result<usize> {
        let count = unsafe { ffi::proj_cs_get_axis_count(self.ctx.as_ptr(), self.handle) };
        if count < 0 {
            Err(self.ctx.last_error("proj_cs_get_axis_count"))
        } else {
            Ok(count as usize)
        }
    }

    /// Description of one axis of a coordinate system object
    pub fn cs_axis_info(&self, index: usize) -> Result<AxisInfo> {
        let mut name: *const c_char = ptr::null();
        let mut abbreviation: *const c_char = ptr::null();
        let mut direction: *const c_char = ptr::null();
        let mut factor = 0.0;
        let mut unit_name: *const c_char = ptr::null();
        let mut unit_auth_name: *const c_char = ptr::null();
        let mut unit_code: *const c_char = ptr::null();

        let ok = unsafe {
            ffi::proj_cs_get_axis_info(
                self.ctx.as_ptr(),
                self.handle,
                index as c_int,
                &mut name,
                &mut abbreviation,
                &mut direction,
                &mut factor,
                &mut unit_name,
                &mut unit_auth_name,
                &mut unit_code,
            )
        };
        if ok == 0 {
            return Err(self.ctx.last_error("proj_cs_get_axis_info"));
        }

        unsafe {
            Ok(AxisInfo {
                name: opt_string(name),
                abbreviation: opt_string(abbreviation),
                direction: opt_string(direction),
                unit_conversion_factor: factor,
                unit_name: opt_string(unit_name),
                unit_auth_name: opt_string(unit_auth_name),
                unit_code: opt_string(unit_code),
            })
        }
    }

    /// All axes of a CRS, walking compound and bound CRSs into their components
    pub fn crs_axes(&self) -> Result<Vec<AxisInfo>> {
        match self.object_type() {
            ObjectType::CompoundCrs => {
                let mut axes = Vec::new();
                let mut index: c_int = 0;
                loop {
                    let handle = unsafe {
                        ffi::proj_crs_get_sub_crs(self.ctx.as_ptr(), self.handle, index)
                    };
                    match self.wrap_optional(handle) {
                        Some(sub) => axes.extend(sub.crs_axes()?),
                        None => break,
                    }
                    index += 1;
                }
                Ok(axes)
            }
            ObjectType::BoundCrs => match self.source_crs() {
                Some(source) => source.crs_axes(),
                None => Ok(Vec::new()),
            },
            _ => match self.coordinate_system() {
                Some(cs) => (0..cs.cs_axis_count()?)
                    .map(|i| cs.cs_axis_info(i))
                    .collect(),
                None => Ok(Vec::new()),
            },
        }
    }

    /// Source CRS of a bound CRS or coordinate operation
    pub fn source_crs(&self) -> Option<Object> {
        let handle = unsafe { ffi::proj_get_source_crs(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Datum of a CRS, falling back to its datum ensemble
    pub fn datum(&self) -> Option<Object> {
        let handle = unsafe { ffi::proj_crs_get_datum(self.ctx.as_ptr(), self.handle) };
        if let Some(datum) = self.wrap_optional(handle) {
            return Some(datum);
        }
        let handle = unsafe { ffi::proj_crs_get_datum_ensemble(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Ellipsoid of a CRS or datum
    pub fn ellipsoid(&self) -> Option<Object> {
        let handle = unsafe { ffi::proj_get_ellipsoid(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Parameters of an ellipsoid object
    pub fn ellipsoid_parameters(&self) -> Result<EllipsoidParameters> {
        let (mut a, mut b, mut inv_f) = (0.0, 0.0, 0.0);
        let mut computed: c_int = 0;
        let ok = unsafe {
            ffi::proj_ellipsoid_get_parameters(
                self.ctx.as_ptr(),
                self.handle,
                &mut a,
                &mut b,
                &mut computed,
                &mut inv_f,
            )
        };
        if ok == 0 {
            return Err(self.ctx.last_error("proj_ellipsoid_get_parameters"));
        }
        Ok(EllipsoidParameters {
            semi_major_metre: a,
            semi_minor_metre: b,
            is_semi_minor_computed: computed != 0,
            inverse_flattening: inv_f,
        })
    }

    /// Prime meridian of a CRS or datum
    pub fn prime_meridian(&self) -> Option<Object> {
        let handle = unsafe { ffi::proj_get_prime_meridian(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Parameters of a prime meridian object
    pub fn prime_meridian_parameters(&self) -> Result<PrimeMeridianParameters> {
        let (mut longitude, mut factor) = (0.0, 0.0);
        let mut unit_name: *const c_char = ptr::null();
        let ok = unsafe {
            ffi::proj_prime_meridian_get_parameters(
                self.ctx.as_ptr(),
                self.handle,
                &mut longitude,
                &mut factor,
                &mut unit_name,
            )
        };
        if ok == 0 {
            return Err(self.ctx.last_error("proj_prime_meridian_get_parameters"));
        }
        Ok(PrimeMeridianParameters {
            longitude,
            unit_conversion_factor: factor,
            unit_name: unsafe { opt_string(unit_name) },
        })
    }

    /// Geodetic CRS underlying a CRS
    pub fn geodetic_crs(&self) -> Option<Object> {
        let handle = unsafe { ffi::proj_crs_get_geodetic_crs(self.ctx.as_ptr(), self.handle) };
        self.wrap_optional(handle)
    }

    /// Copy of the object with axes in longitude/latitude, easting/northing order
    pub fn normalized_for_visualization(&self) -> Result<Object> {
        let handle =
            unsafe { ffi::proj_normalize_for_visualization(self.ctx.as_ptr(), self.handle) };
        Object::wrap(&self.ctx, handle, "proj_normalize_for_visualization")
    }

    /// Compare two objects under the given criterion
    pub fn is_equivalent_to(&self, other: &Object, criterion: Comparison) -> bool {
        unsafe {
            ffi::proj_is_equivalent_to_with_ctx(
                self.ctx.as_ptr(),
                self.handle,
                other.handle,
                criterion.into(),
            ) != 0
        }
    }

    /// WKT2:2019 representation
    pub fn as_wkt(&self) -> Option<String> {
        unsafe {
            opt_string(ffi::proj_as_wkt(
                self.ctx.as_ptr(),
                self.handle,
                ffi::PJ_WKT_TYPE_PJ_WKT2_2019,
                ptr::null(),
            ))
        }
    }

    /// PROJ.4 string representation
    pub fn as_proj_string(&self) -> Option<String> {
        unsafe {
            opt_string(ffi::proj_as_proj_string(
                self.ctx.as_ptr(),
                self.handle,
                ffi::PJ_PROJ_STRING_TYPE_PJ_PROJ_4,
                ptr::null(),
            ))
        }
    }

    /// PROJJSON representation
    pub fn as_projjson(&self) -> Option<String> {
        unsafe {
            opt_string(ffi::proj_as_projjson(
                self.ctx.as_ptr(),
                self.handle,
                ptr::null(),
            ))
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                ffi::proj_destroy(self.handle);
            }
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.object_type())
            .field("name", &self.name())
            .finish()
    }
}

fn to_c_string(value: &str, what: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::InvalidInput(format!("{} contains null bytes", what)))
}

/// Copy a PROJ-owned C string; PROJ keeps ownership of the pointer.
pub(crate) unsafe fn opt_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

use error_stack::ResultExt;
use itertools::Itertools;
use ndarray::ArrayD;
use netcdf::{
    types::{FloatType, IntType, NcVariableType},
    AttributeValue, Extents, NcTypeDescriptor,
};
use num_traits::NumCast;

use crate::error::GridError;

/// Attribute holding the value used to mark missing data.
pub const FILL_VALUE_ATTR: &str = "_FillValue";
/// Older convention for missing data, still used by some satellite products.
pub const MISSING_VALUE_ATTR: &str = "missing_value";

/// A type that can hold a variety of arrays that might be stored
/// in a netCDF file. It is best created by reading from a netCDF
/// variable with its `get_from` method.
#[derive(Debug, Clone)]
pub enum NcArray {
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Char(ArrayD<u8>),
}

/// Returns `true` if [`NcArray::get_from`] can read variables of this type.
pub fn is_supported_type(vartype: &NcVariableType) -> bool {
    matches!(
        vartype,
        NcVariableType::Int(_) | NcVariableType::Float(_) | NcVariableType::Char
    )
}

/// Returns `true` for integer and floating point types, i.e. the types whose
/// values can be interpolated.
pub fn is_numeric_type(vartype: &NcVariableType) -> bool {
    matches!(vartype, NcVariableType::Int(_) | NcVariableType::Float(_))
}

/// A short name for a netCDF type, for error messages.
pub fn type_name(vartype: &NcVariableType) -> &'static str {
    match vartype {
        NcVariableType::Compound(_) => "compound",
        NcVariableType::Opaque(_) => "opaque",
        NcVariableType::Enum(_) => "enum",
        NcVariableType::Vlen(_) => "vlen",
        NcVariableType::String => "string",
        NcVariableType::Int(IntType::I8) => "byte",
        NcVariableType::Int(IntType::I16) => "short",
        NcVariableType::Int(IntType::I32) => "int",
        NcVariableType::Int(IntType::I64) => "int64",
        NcVariableType::Int(IntType::U8) => "ubyte",
        NcVariableType::Int(IntType::U16) => "ushort",
        NcVariableType::Int(IntType::U32) => "uint",
        NcVariableType::Int(IntType::U64) => "uint64",
        NcVariableType::Float(FloatType::F32) => "float",
        NcVariableType::Float(FloatType::F64) => "double",
        NcVariableType::Char => "char",
    }
}

impl NcArray {
    /// Retrieve data from a netCDF variable and construct the appropriate variant.
    ///
    /// Compound, opaque, enum, variable length, and string types are not supported
    /// and return [`GridError::UnsupportedType`]; check [`is_supported_type`] first
    /// to skip such variables instead.
    pub fn get_from(var: &netcdf::Variable) -> error_stack::Result<Self, GridError> {
        let arr = match var.vartype() {
            NcVariableType::Int(IntType::I8) => get_all(var).map(Self::I8),
            NcVariableType::Int(IntType::I16) => get_all(var).map(Self::I16),
            NcVariableType::Int(IntType::I32) => get_all(var).map(Self::I32),
            NcVariableType::Int(IntType::I64) => get_all(var).map(Self::I64),
            NcVariableType::Int(IntType::U8) => get_all(var).map(Self::U8),
            NcVariableType::Int(IntType::U16) => get_all(var).map(Self::U16),
            NcVariableType::Int(IntType::U32) => get_all(var).map(Self::U32),
            NcVariableType::Int(IntType::U64) => get_all(var).map(Self::U64),
            NcVariableType::Float(FloatType::F32) => get_all(var).map(Self::F32),
            NcVariableType::Float(FloatType::F64) => get_all(var).map(Self::F64),
            NcVariableType::Char => get_all(var).map(Self::Char),
            other => {
                return Err(GridError::UnsupportedType {
                    name: var.name(),
                    vartype: type_name(&other).to_string(),
                }
                .into())
            }
        };
        arr.change_context_lazy(|| {
            GridError::context(format!("Error reading variable '{}'", var.name()))
        })
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            NcArray::I8(arr) => arr.shape(),
            NcArray::I16(arr) => arr.shape(),
            NcArray::I32(arr) => arr.shape(),
            NcArray::I64(arr) => arr.shape(),
            NcArray::U8(arr) => arr.shape(),
            NcArray::U16(arr) => arr.shape(),
            NcArray::U32(arr) => arr.shape(),
            NcArray::U64(arr) => arr.shape(),
            NcArray::F32(arr) => arr.shape(),
            NcArray::F64(arr) => arr.shape(),
            NcArray::Char(arr) => arr.shape(),
        }
    }

    /// Create a variable in a netCDF file and write this data to it.
    ///
    /// If `fill` is given and representable in this array's type, it is set as the
    /// variable's fill value before the data is written (netCDF-4 does not allow
    /// changing the fill value afterwards).
    pub fn put_to<'f>(
        &self,
        file: &'f mut netcdf::FileMut,
        name: &str,
        dims: &[&str],
        fill: Option<f64>,
    ) -> netcdf::Result<netcdf::VariableMut<'f>> {
        match self {
            NcArray::I8(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::I16(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::I32(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::I64(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::U8(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::U16(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::U32(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::U64(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::F32(arr) => put_typed(file, name, dims, arr, fill),
            NcArray::F64(arr) => put_typed(file, name, dims, arr, fill),
            // Char data has no fill value handling
            NcArray::Char(arr) => put_typed(file, name, dims, arr, None),
        }
    }
}

fn get_all<T: NcTypeDescriptor + Copy>(var: &netcdf::Variable) -> netcdf::Result<ArrayD<T>> {
    var.get::<T, _>(Extents::All)
}

fn put_typed<'f, T: NcTypeDescriptor + Copy + NumCast>(
    file: &'f mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    arr: &ArrayD<T>,
    fill: Option<f64>,
) -> netcdf::Result<netcdf::VariableMut<'f>> {
    let mut var = file.add_variable::<T>(name, dims)?;
    if let Some(fill) = fill.and_then(<T as NumCast>::from) {
        var.set_fill_value(fill)?;
    }
    var.put(arr.view(), Extents::All)?;
    Ok(var)
}

/// Format an array shape the way a tuple is usually written: `(2, 3, 4)`,
/// `(5,)` for one dimension, and `()` for a scalar.
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        _ => format!("({})", shape.iter().join(", ")),
    }
}

/// Convert a numeric attribute holding one value to a float.
///
/// Returns `None` for strings and for arrays with other than one element.
pub fn attr_as_f64(value: &AttributeValue) -> Option<f64> {
    fn single<T: Copy + Into<f64>>(v: &[T]) -> Option<f64> {
        if v.len() == 1 {
            Some(v[0].into())
        } else {
            None
        }
    }

    match value {
        AttributeValue::Uchar(v) => Some(*v as f64),
        AttributeValue::Uchars(v) => single(v),
        AttributeValue::Schar(v) => Some(*v as f64),
        AttributeValue::Schars(v) => single(v),
        AttributeValue::Ushort(v) => Some(*v as f64),
        AttributeValue::Ushorts(v) => single(v),
        AttributeValue::Short(v) => Some(*v as f64),
        AttributeValue::Shorts(v) => single(v),
        AttributeValue::Uint(v) => Some(*v as f64),
        AttributeValue::Uints(v) => single(v),
        AttributeValue::Int(v) => Some(*v as f64),
        AttributeValue::Ints(v) => single(v),
        AttributeValue::Ulonglong(v) => Some(*v as f64),
        AttributeValue::Ulonglongs(v) if v.len() == 1 => Some(v[0] as f64),
        AttributeValue::Longlong(v) => Some(*v as f64),
        AttributeValue::Longlongs(v) if v.len() == 1 => Some(v[0] as f64),
        AttributeValue::Float(v) => Some(*v as f64),
        AttributeValue::Floats(v) => single(v),
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Doubles(v) => single(v),
        _ => None,
    }
}

/// Get the value a variable uses to mark missing data, from `_FillValue` or,
/// failing that, `missing_value`.
pub fn get_fill_value(var: &netcdf::Variable) -> Option<f64> {
    [FILL_VALUE_ATTR, MISSING_VALUE_ATTR].into_iter().find_map(|attr_name| {
        var.attribute(attr_name)
            .and_then(|att| att.value().ok())
            .and_then(|v| attr_as_f64(&v))
    })
}

/// Read a one dimensional coordinate variable as floats.
pub fn read_coordinate(
    file: &netcdf::File,
    name: &str,
) -> error_stack::Result<Vec<f64>, GridError> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridError::missing_variable(name))?;

    let ndim = var.dimensions().len();
    if ndim != 1 {
        return Err(GridError::CoordinateNotOneDimensional {
            name: name.to_string(),
            ndim,
        }
        .into());
    }

    var.get_values::<f64, _>(Extents::All)
        .change_context_lazy(|| GridError::context(format!("Error reading coordinate '{name}'")))
}

/// Copy all attributes of `src` onto `dest`, except for those named in `skip`.
///
/// Attributes that cannot be read are logged and skipped rather than failing
/// the whole copy.
pub fn copy_var_attributes(
    src: &netcdf::Variable,
    dest: &mut netcdf::VariableMut,
    skip: &[&str],
) -> netcdf::Result<()> {
    for att in src.attributes() {
        let att_name = att.name().to_string();
        if skip.contains(&att_name.as_str()) {
            continue;
        }
        match att.value() {
            Ok(value) => {
                dest.put_attribute(&att_name, value)?;
            }
            Err(e) => log::warn!(
                "Could not read attribute '{att_name}' of variable '{}', not copying it: {e}",
                src.name()
            ),
        }
    }
    Ok(())
}

/// Copy all global attributes of `src` onto `dest`.
pub fn copy_global_attributes(
    src: &netcdf::File,
    dest: &mut netcdf::FileMut,
) -> netcdf::Result<()> {
    for att in src.attributes() {
        let att_name = att.name().to_string();
        match att.value() {
            Ok(value) => {
                dest.add_attribute(&att_name, value)?;
            }
            Err(e) => {
                log::warn!("Could not read global attribute '{att_name}', not copying it: {e}")
            }
        }
    }
    Ok(())
}

/// Library image format (.dll)
///
/// Layout:
/// [4 bytes] Magic: "SWBL"
/// [4 bytes] Manifest length (u32 LE)
/// [N bytes] JSON manifest
/// [4 bytes] Payload length (u32 LE)
/// [M bytes] JSON-serialized CompiledLibrary

use std::hash::Hasher;
use std::io::{self, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::hash::DeterministicHasher;
use crate::ir::CompiledLibrary;
use crate::options::{OptimizationLevel, OutputKind};

const MAGIC: &[u8; 4] = b"SWBL";
pub const FORMAT: &str = "switchbench-image-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub assembly: String,
    pub output_kind: OutputKind,
    pub optimization: OptimizationLevel,
    pub format: String,
    /// Identity of this build: a payload hash, salted with the clock unless deterministic.
    pub module_id: String,
    pub classes: usize,
}

fn module_id(payload: &[u8], deterministic: bool) -> String {
    let mut hasher = DeterministicHasher::new();
    hasher.write(payload);
    if !deterministic {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        hasher.write(&nanos.to_le_bytes());
    }
    format!("{:016x}", hasher.finish())
}

fn write_section<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "image section exceeds 4 GiB"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(bytes)
}

fn read_section<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let mut bytes = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Serialize a CompiledLibrary into the image format.
pub fn write_image<W: Write>(
    writer: &mut W,
    library: &CompiledLibrary,
    deterministic: bool,
) -> io::Result<Manifest> {
    let payload = serde_json::to_vec(library).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let manifest = Manifest {
        assembly: library.assembly_name.clone(),
        output_kind: library.output_kind,
        optimization: library.optimization,
        format: FORMAT.to_string(),
        module_id: module_id(&payload, deterministic),
        classes: library.classes.len(),
    };
    let manifest_bytes =
        serde_json::to_vec(&manifest).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    writer.write_all(MAGIC)?;
    write_section(writer, &manifest_bytes)?;
    write_section(writer, &payload)?;
    Ok(manifest)
}

/// Deserialize an image written by `write_image`.
pub fn read_image<R: Read>(reader: &mut R) -> io::Result<(Manifest, CompiledLibrary)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid magic number: expected SWBL, got {:?}", magic),
        ));
    }

    let manifest: Manifest = serde_json::from_slice(&read_section(reader)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if manifest.format != FORMAT {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unsupported image format '{}'", manifest.format),
        ));
    }

    let library: CompiledLibrary = serde_json::from_slice(&read_section(reader)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok((manifest, library))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    fn sample() -> CompiledLibrary {
        let mut function = CompiledFunction::new("M", vec!["s".to_string()]);
        function.emit(Instruction::a_only(Opcode::LoadNull, 0));
        function.emit(Instruction::a_only(Opcode::Return, 0));
        function.add_constant(Constant::String("test".to_string()));
        let mut library = CompiledLibrary::new(
            "Assm",
            OutputKind::DynamicallyLinkedLibrary,
            OptimizationLevel::Release,
            "Ns",
        );
        library.classes.push(CompiledClass {
            name: "C".to_string(),
            modifiers: vec!["public".to_string()],
            methods: vec![function],
        });
        library
    }

    #[test]
    fn image_preserves_methods_and_manifest() {
        let mut buf: Vec<u8> = Vec::new();
        let written = write_image(&mut buf, &sample(), true).expect("write failed");
        assert_eq!(&buf[..4], MAGIC);

        let (manifest, loaded) = read_image(&mut std::io::Cursor::new(buf)).expect("read failed");
        assert_eq!(manifest, written);
        assert_eq!(manifest.classes, 1);
        let method = loaded.find_method("Ns.C", "M").expect("method missing");
        assert_eq!(method.instructions.len(), 2);
        assert_eq!(method.constants, vec![Constant::String("test".to_string())]);
    }

    #[test]
    fn deterministic_builds_are_byte_identical() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_image(&mut first, &sample(), true).expect("write failed");
        write_image(&mut second, &sample(), true).expect("write failed");
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_magic_is_rejected() {
        let buf = b"BAAD\x00\x00\x00\x00";
        let result = read_image(&mut std::io::Cursor::new(buf.to_vec()));
        assert_eq!(result.err().map(|e| e.kind()), Some(io::ErrorKind::InvalidData));
    }
}

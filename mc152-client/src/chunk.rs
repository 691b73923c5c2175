//! Decoding of the bulk chunk transfer payload into chunk columns.

use std::io;

use flate2::read::ZlibDecoder;

use mc152::chunk::{read_column_stream, ChunkColumn};

use crate::proto::MapChunkBulkPacket;


/// Decompress and decode the columns carried by a bulk chunk packet, using
/// the per-column metadata it was transferred with.
pub fn read_chunk_bulk(packet: &MapChunkBulkPacket) -> io::Result<Vec<ChunkColumn>> {
    let mut decoder = ZlibDecoder::new(&packet.compressed_data[..]);
    read_column_stream(&mut decoder, &packet.metadata, packet.sky_light)
}

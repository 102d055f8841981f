//! Reference flash filesystem
//!
//! `MemFs` is a deliberately small [`FlashFs`] used to drive the bridge and
//! the lifecycle in tests. Object metadata lives in RAM; file contents live
//! on flash and every byte goes through the [`FlashHal`] it was mounted
//! with. Each object owns one logical block. The last logical block of the
//! region is a spare used to rewrite a block when new data cannot simply
//! be programmed over the old.

use alloc::vec::Vec;

use spiflash_fs_core::error::Error;
use spiflash_fs_core::flash::FlashHal;
use spiflash_fs_core::fs::{
    FlashFs, FsBuffers, FsConfig, FsError, FsFile, FsFlags, FsStat, Whence, OBJ_NAME_LEN,
};

struct Object {
    name: heapless::String<OBJ_NAME_LEN>,
    size: u32,
}

struct OpenFile {
    slot: usize,
    pos: u32,
    flags: FsFlags,
}

/// Minimal flash filesystem with one logical block per object
pub struct MemFs<'a, H> {
    hal: H,
    cfg: FsConfig,
    work: &'a mut [u8],
    cache: &'a mut [u8],
    objects: Vec<Option<Object>>,
    files: Vec<Option<OpenFile>>,
}

fn hal_err(e: Error) -> FsError {
    log::error!("memfs: flash access failed: {}", e);
    FsError::Hal
}

impl<'a, H: FlashHal> MemFs<'a, H> {
    /// Get the flash access the filesystem runs on
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Get the flash access mutably
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Number of objects stored
    pub fn object_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }

    /// Number of objects that fit
    pub fn capacity(&self) -> usize {
        self.objects.len()
    }

    /// Largest object size in bytes
    pub fn max_object_size(&self) -> u32 {
        self.cfg.log_block_size
    }

    /// Number of files that can be open at once
    pub fn max_open_files(&self) -> usize {
        self.files.len()
    }

    fn slot_addr(&self, slot: usize) -> u32 {
        self.cfg.phys_addr + slot as u32 * self.cfg.log_block_size
    }

    fn spare_addr(&self) -> u32 {
        self.slot_addr(self.objects.len())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.objects
            .iter()
            .position(|o| o.as_ref().is_some_and(|o| o.name.as_str() == name))
    }

    fn file_index(&self, file: FsFile) -> Result<usize, FsError> {
        let idx = usize::try_from(i32::from(file.0) - 1).map_err(|_| FsError::BadDescriptor)?;
        match self.files.get(idx) {
            None => Err(FsError::BadDescriptor),
            Some(None) => Err(FsError::FileClosed),
            Some(Some(_)) => Ok(idx),
        }
    }

    fn open_file(&mut self, file: FsFile) -> Result<&mut OpenFile, FsError> {
        let idx = self.file_index(file)?;
        self.files[idx].as_mut().ok_or(FsError::FileClosed)
    }

    fn object(&mut self, slot: usize) -> Result<&mut Object, FsError> {
        self.objects
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(FsError::FileDeleted)
    }

    fn erase_slot(&mut self, slot: usize) -> Result<(), FsError> {
        let addr = self.slot_addr(slot);
        self.hal
            .erase(addr, self.cfg.log_block_size)
            .map_err(hal_err)
    }

    /// Whether `data` can be programmed at `addr` without an erase
    fn programmable(&mut self, addr: u32, data: &[u8]) -> Result<bool, FsError> {
        let chunk = self.work.len();
        for (i, want) in data.chunks(chunk).enumerate() {
            let have = &mut self.work[..want.len()];
            self.hal
                .read(addr + (i * chunk) as u32, have)
                .map_err(hal_err)?;
            if have.iter().zip(want).any(|(&h, &w)| h & w != w) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Copy `len` bytes between blocks, overlaying `data` at `offset`
    fn copy_block(
        &mut self,
        from: u32,
        to: u32,
        len: u32,
        overlay: Option<(u32, &[u8])>,
    ) -> Result<(), FsError> {
        let chunk = core::cmp::min(self.cache.len(), self.cfg.log_page_size as usize) as u32;
        let mut start = 0;

        while start < len {
            let n = core::cmp::min(chunk, len - start);
            let buf = &mut self.cache[..n as usize];
            self.hal.read(from + start, buf).map_err(hal_err)?;

            if let Some((offset, data)) = overlay {
                let lo = core::cmp::max(start, offset);
                let hi = core::cmp::min(start + n, offset + data.len() as u32);
                if lo < hi {
                    buf[(lo - start) as usize..(hi - start) as usize]
                        .copy_from_slice(&data[(lo - offset) as usize..(hi - offset) as usize]);
                }
            }

            self.hal.write(to + start, buf).map_err(hal_err)?;
            start += n;
        }
        Ok(())
    }

    fn program(&mut self, slot: usize, offset: u32, data: &[u8], size: u32) -> Result<(), FsError> {
        let addr = self.slot_addr(slot) + offset;
        if self.programmable(addr, data)? {
            return self.hal.write(addr, data).map_err(hal_err);
        }

        log::debug!("memfs: rewriting slot {} through the spare block", slot);
        let slot_addr = self.slot_addr(slot);
        let spare = self.spare_addr();
        let new_size = core::cmp::max(size, offset + data.len() as u32);

        self.hal
            .erase(spare, self.cfg.log_block_size)
            .map_err(hal_err)?;
        self.copy_block(slot_addr, spare, new_size, Some((offset, data)))?;
        self.erase_slot(slot)?;
        self.copy_block(spare, slot_addr, new_size, None)
    }
}

impl<'a, H: FlashHal> FlashFs<'a> for MemFs<'a, H> {
    type Hal = H;

    fn mount(config: &FsConfig, mut hal: H, buffers: FsBuffers<'a>) -> Result<Self, FsError> {
        let max_files = buffers.max_open_files();
        let FsBuffers { work, cache, .. } = buffers;

        let page = config.log_page_size as usize;
        let blocks = if config.log_block_size == 0 {
            0
        } else {
            config.phys_size / config.log_block_size
        };
        if page == 0 || blocks < 2 || work.len() < 2 * page || cache.is_empty() || max_files == 0 {
            log::error!(
                "memfs: unusable geometry ({} blocks, {} byte pages) or buffers",
                blocks,
                page
            );
            return Err(FsError::NotConfigured);
        }

        // Make sure the region is reachable before accepting it
        hal.read(config.phys_addr, &mut work[..page])
            .map_err(hal_err)?;

        let slots = blocks as usize - 1;
        log::debug!(
            "memfs: {} objects of up to {} bytes, {} open files",
            slots,
            config.log_block_size,
            max_files
        );

        let mut objects = Vec::with_capacity(slots);
        objects.resize_with(slots, || None);
        let mut files = Vec::with_capacity(max_files);
        files.resize_with(max_files, || None);

        Ok(Self {
            hal,
            cfg: *config,
            work,
            cache,
            objects,
            files,
        })
    }

    fn open(&mut self, path: &str, flags: FsFlags, _mode: u32) -> Result<FsFile, FsError> {
        if path.is_empty() {
            return Err(FsError::NotFound);
        }
        if path.len() >= OBJ_NAME_LEN {
            return Err(FsError::NameTooLong);
        }
        let fd = self
            .files
            .iter()
            .position(Option::is_none)
            .ok_or(FsError::OutOfFileDescs)?;

        let slot = match self.find(path) {
            Some(slot) => {
                if flags.contains(FsFlags::CREAT | FsFlags::EXCL) {
                    return Err(FsError::FileExists);
                }
                if flags.contains(FsFlags::TRUNC) && self.object(slot)?.size > 0 {
                    self.erase_slot(slot)?;
                    self.object(slot)?.size = 0;
                }
                slot
            }
            None => {
                if !flags.contains(FsFlags::CREAT) {
                    return Err(FsError::NotFound);
                }
                let slot = self
                    .objects
                    .iter()
                    .position(Option::is_none)
                    .ok_or(FsError::Full)?;
                self.erase_slot(slot)?;

                let mut name = heapless::String::new();
                name.push_str(path).map_err(|_| FsError::NameTooLong)?;
                self.objects[slot] = Some(Object { name, size: 0 });
                log::trace!("memfs: created {} in slot {}", path, slot);
                slot
            }
        };

        self.files[fd] = Some(OpenFile {
            slot,
            pos: 0,
            flags,
        });
        Ok(FsFile(fd as i16 + 1))
    }

    fn close(&mut self, file: FsFile) -> Result<(), FsError> {
        let idx = self.file_index(file)?;
        self.files[idx] = None;
        Ok(())
    }

    fn read(&mut self, file: FsFile, buf: &mut [u8]) -> Result<usize, FsError> {
        let (slot, pos, flags) = {
            let f = self.open_file(file)?;
            (f.slot, f.pos, f.flags)
        };
        if !flags.contains(FsFlags::RDONLY) {
            return Err(FsError::NotReadable);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let size = self.object(slot)?.size;
        if pos >= size {
            return Err(FsError::EndOfObject);
        }
        let n = core::cmp::min(buf.len(), (size - pos) as usize);
        let addr = self.slot_addr(slot) + pos;
        self.hal.read(addr, &mut buf[..n]).map_err(hal_err)?;

        self.open_file(file)?.pos = pos + n as u32;
        Ok(n)
    }

    fn write(&mut self, file: FsFile, data: &[u8]) -> Result<usize, FsError> {
        let (slot, pos, flags) = {
            let f = self.open_file(file)?;
            (f.slot, f.pos, f.flags)
        };
        if !flags.contains(FsFlags::WRONLY) {
            return Err(FsError::NotWritable);
        }
        if data.is_empty() {
            return Ok(0);
        }

        let size = self.object(slot)?.size;
        let pos = if flags.contains(FsFlags::APPEND) {
            size
        } else {
            pos
        };
        let end = pos as u64 + data.len() as u64;
        if end > self.cfg.log_block_size as u64 {
            return Err(FsError::Full);
        }
        let end = end as u32;

        self.program(slot, pos, data, size)?;

        let obj = self.object(slot)?;
        obj.size = core::cmp::max(obj.size, end);
        self.open_file(file)?.pos = end;
        Ok(data.len())
    }

    fn lseek(&mut self, file: FsFile, offset: i32, whence: Whence) -> Result<u32, FsError> {
        let (slot, pos) = {
            let f = self.open_file(file)?;
            (f.slot, f.pos)
        };
        let size = self.object(slot)?.size;

        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => i64::from(pos),
            Whence::End => i64::from(size),
        };
        let target = base + i64::from(offset);
        if target < 0 || target > i64::from(size) {
            return Err(FsError::SeekBounds);
        }

        self.open_file(file)?.pos = target as u32;
        Ok(target as u32)
    }

    fn fstat(&mut self, file: FsFile) -> Result<FsStat, FsError> {
        let slot = self.open_file(file)?.slot;
        let obj = self.object(slot)?;
        Ok(FsStat {
            obj_id: slot as u16 + 1,
            size: obj.size,
            name: obj.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use spiflash_fs_core::error::Result as HalResult;
    use spiflash_fs_core::fs::{fd_table_size, work_buf_size};

    /// Flash array that enforces NOR semantics without a bus in between
    struct RamFlash {
        data: Vec<u8>,
        erases: usize,
    }

    impl RamFlash {
        fn new(size: usize) -> Self {
            Self {
                data: vec![0xFF; size],
                erases: 0,
            }
        }
    }

    impl FlashHal for RamFlash {
        fn read(&mut self, addr: u32, buf: &mut [u8]) -> HalResult<()> {
            let a = addr as usize;
            buf.copy_from_slice(&self.data[a..a + buf.len()]);
            Ok(())
        }

        fn write(&mut self, addr: u32, data: &[u8]) -> HalResult<()> {
            let a = addr as usize;
            for (dst, &src) in self.data[a..a + data.len()].iter_mut().zip(data) {
                *dst &= src;
            }
            Ok(())
        }

        fn erase(&mut self, addr: u32, size: u32) -> HalResult<()> {
            let a = addr as usize;
            self.data[a..a + size as usize].fill(0xFF);
            self.erases += 1;
            Ok(())
        }
    }

    const BLOCK: u32 = 4096;

    fn config() -> FsConfig {
        FsConfig {
            phys_addr: 0,
            phys_size: 4 * BLOCK,
            phys_erase_block: BLOCK,
            log_block_size: BLOCK,
            log_page_size: 256,
        }
    }

    struct Bufs {
        work: [u8; work_buf_size(256)],
        fds: [u8; fd_table_size(2)],
        cache: [u8; 256],
    }

    impl Bufs {
        fn new() -> Self {
            Self {
                work: [0; work_buf_size(256)],
                fds: [0; fd_table_size(2)],
                cache: [0; 256],
            }
        }

        fn buffers(&mut self) -> FsBuffers<'_> {
            FsBuffers {
                work: &mut self.work,
                fds: &mut self.fds,
                cache: &mut self.cache,
            }
        }
    }

    fn mount(bufs: &mut Bufs) -> MemFs<'_, RamFlash> {
        MemFs::mount(&config(), RamFlash::new(4 * BLOCK as usize), bufs.buffers()).unwrap()
    }

    #[test]
    fn test_geometry() {
        let mut bufs = Bufs::new();
        let fs = mount(&mut bufs);
        assert_eq!(fs.capacity(), 3);
        assert_eq!(fs.max_open_files(), 2);
        assert_eq!(fs.max_object_size(), BLOCK);
    }

    #[test]
    fn test_mount_rejects_tiny_region() {
        let mut bufs = Bufs::new();
        let cfg = FsConfig {
            phys_size: BLOCK,
            ..config()
        };
        let res = MemFs::mount(&cfg, RamFlash::new(BLOCK as usize), bufs.buffers());
        assert!(matches!(res, Err(FsError::NotConfigured)));
    }

    #[test]
    fn test_create_write_read() {
        let mut bufs = Bufs::new();
        let mut fs = mount(&mut bufs);

        let f = fs
            .open("a.txt", FsFlags::CREAT | FsFlags::RDWR, 0)
            .unwrap();
        assert_eq!(fs.write(f, b"hello world"), Ok(11));
        assert_eq!(fs.lseek(f, 6, Whence::Set), Ok(6));

        let mut buf = [0u8; 16];
        assert_eq!(fs.read(f, &mut buf), Ok(5));
        assert_eq!(&buf[..5], b"world");
        assert_eq!(fs.read(f, &mut buf), Err(FsError::EndOfObject));
        assert_eq!(&fs.hal().data[..11], b"hello world");
    }

    #[test]
    fn test_overwrite_goes_through_spare() {
        let mut bufs = Bufs::new();
        let mut fs = mount(&mut bufs);

        let f = fs.open("x", FsFlags::CREAT | FsFlags::RDWR, 0).unwrap();
        fs.write(f, b"aaaa").unwrap();
        fs.lseek(f, 1, Whence::Set).unwrap();
        fs.write(f, b"ZZ").unwrap();

        fs.lseek(f, 0, Whence::Set).unwrap();
        let mut buf = [0u8; 4];
        fs.read(f, &mut buf).unwrap();
        assert_eq!(&buf, b"aZZa");
        // create, spare, slot
        assert_eq!(fs.hal().erases, 3);
    }

    #[test]
    fn test_open_semantics() {
        let mut bufs = Bufs::new();
        let mut fs = mount(&mut bufs);

        assert_eq!(fs.open("missing", FsFlags::RDONLY, 0), Err(FsError::NotFound));
        let f = fs.open("f", FsFlags::CREAT | FsFlags::WRONLY, 0).unwrap();
        assert_eq!(
            fs.open("f", FsFlags::CREAT | FsFlags::EXCL | FsFlags::WRONLY, 0),
            Err(FsError::FileExists)
        );
        let _g = fs.open("f", FsFlags::RDONLY, 0).unwrap();
        assert_eq!(fs.open("f", FsFlags::RDONLY, 0), Err(FsError::OutOfFileDescs));
        assert_eq!(
            fs.open("a-name-that-is-way-too-long-to-store", FsFlags::CREAT, 0),
            Err(FsError::NameTooLong)
        );

        fs.close(f).unwrap();
        assert_eq!(fs.close(f), Err(FsError::FileClosed));
        assert_eq!(fs.close(FsFile(9)), Err(FsError::BadDescriptor));
    }

    #[test]
    fn test_access_checks() {
        let mut bufs = Bufs::new();
        let mut fs = mount(&mut bufs);

        let w = fs.open("f", FsFlags::CREAT | FsFlags::WRONLY, 0).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(fs.read(w, &mut buf), Err(FsError::NotReadable));
        fs.close(w).unwrap();

        let r = fs.open("f", FsFlags::RDONLY, 0).unwrap();
        assert_eq!(fs.write(r, b"x"), Err(FsError::NotWritable));
    }

    #[test]
    fn test_append_truncate_and_full() {
        let mut bufs = Bufs::new();
        let mut fs = mount(&mut bufs);

        let f = fs.open("log", FsFlags::CREAT | FsFlags::WRONLY, 0).unwrap();
        fs.write(f, b"one").unwrap();
        fs.close(f).unwrap();

        let f = fs
            .open("log", FsFlags::WRONLY | FsFlags::APPEND, 0)
            .unwrap();
        fs.write(f, b"two").unwrap();
        assert_eq!(fs.fstat(f).unwrap().size, 6);
        assert_eq!(fs.lseek(f, 1, Whence::End), Err(FsError::SeekBounds));
        fs.close(f).unwrap();

        let f = fs.open("log", FsFlags::WRONLY | FsFlags::TRUNC, 0).unwrap();
        let st = fs.fstat(f).unwrap();
        assert_eq!(st.size, 0);
        assert_eq!(st.name.as_str(), "log");
        let big = vec![0u8; BLOCK as usize + 1];
        assert_eq!(fs.write(f, &big), Err(FsError::Full));
        fs.close(f).unwrap();

        fs.open("b", FsFlags::CREAT | FsFlags::WRONLY, 0)
            .and_then(|f| fs.close(f))
            .unwrap();
        let g = fs.open("c", FsFlags::CREAT | FsFlags::WRONLY, 0).unwrap();
        fs.close(g).unwrap();
        assert_eq!(fs.object_count(), 3);
        assert_eq!(
            fs.open("d", FsFlags::CREAT | FsFlags::WRONLY, 0),
            Err(FsError::Full)
        );
    }
}

use embedded_io::{Read, Seek, SeekFrom, Write};
use spiflash_fs_core::bridge::translate_flags;
use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_core::device::{DeviceHandle, DeviceInstance, MountedDevice};
use spiflash_fs_core::flash::SpiFlashDevice;
use spiflash_fs_core::fs::{fd_table_size, FsFlags};
use spiflash_fs_core::vfs::{DeviceTable, Errno, File, FileBackend, OpenFlags, Whence};
use spiflash_fs_dummy::{DummyChip, DummyConfig, MemFs};

const CHIP_SIZE: usize = 0x4_0000;

type Instance = DeviceInstance<512, { fd_table_size(3) }, 256>;
type Mounted<'a> = MountedDevice<MemFs<'a, SpiFlashDevice<DummyChip>>>;

fn instance() -> Instance {
    let cfg = FlashConfig::DEFAULT
        .with_region(0, CHIP_SIZE as u32)
        .with_geometry(0x1_0000, 0x1_0000, 256);
    DeviceInstance::new("/mnt/spiffs", cfg)
}

fn mount(inst: &mut Instance) -> Mounted<'_> {
    let chip = DummyChip::new(DummyConfig {
        size: CHIP_SIZE,
        ..DummyConfig::default()
    });
    DeviceHandle::register(inst)
        .activate::<MemFs<'_, _>, _>(chip)
        .unwrap()
}

#[test]
fn open_flags_map_exactly() {
    let modes = [
        (OpenFlags::RDONLY, FsFlags::RDONLY),
        (OpenFlags::WRONLY, FsFlags::WRONLY),
        (OpenFlags::RDWR, FsFlags::RDWR),
    ];
    let modifiers = [
        (OpenFlags::APPEND, FsFlags::APPEND),
        (OpenFlags::CREAT, FsFlags::CREAT),
        (OpenFlags::TRUNC, FsFlags::TRUNC),
    ];

    for (host_mode, fs_mode) in modes {
        for mask in 0..(1 << modifiers.len()) {
            let mut host = host_mode;
            let mut expected = fs_mode;
            for (bit, (host_flag, fs_flag)) in modifiers.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    host |= *host_flag;
                    expected |= *fs_flag;
                }
            }
            assert_eq!(translate_flags(host), expected, "host flags {:?}", host);
        }
    }
}

#[test]
fn hello_round_trip() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);
    let mut table: DeviceTable<'_, 2> = DeviceTable::new();
    table.register(&mut dev).unwrap();

    let fd = table
        .open(
            "/mnt/spiffs/data.bin",
            OpenFlags::CREAT | OpenFlags::WRONLY,
            0,
        )
        .unwrap();
    assert_eq!(table.write(&fd, b"hello"), Ok(5));
    table.close(fd).unwrap();

    let fd = table
        .open("/mnt/spiffs/data.bin", OpenFlags::RDONLY, 0)
        .unwrap();
    let mut buf = [0u8; 5];
    assert_eq!(table.read(&fd, &mut buf), Ok(5));
    assert_eq!(&buf, b"hello");
    assert_eq!(table.read(&fd, &mut buf), Ok(0));
    table.close(fd).unwrap();

    drop(table);
    assert_eq!(dev.fs().hal().bus().violations(), 0);
}

#[test]
fn stat_reports_written_size() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);

    for (i, k) in [0usize, 1, 255, 256, 257, 1000].into_iter().enumerate() {
        let path = format!("/mnt/spiffs/f{}", i % 3);
        let data = vec![0x5Au8; k];

        let h = dev
            .open(&path, OpenFlags::CREAT | OpenFlags::TRUNC | OpenFlags::WRONLY, 0)
            .unwrap();
        assert_eq!(dev.write(&h, &data), Ok(k));
        dev.close(h).unwrap();

        let h = dev.open(&path, OpenFlags::RDONLY, 0).unwrap();
        let st = dev.stat(&h).unwrap();
        assert_eq!(st.st_size, k as i64);
        assert_ne!(st.st_ino, 0);
        assert_eq!(st.st_mode, 0);
        assert_eq!(st.st_blksize, 0);
        dev.close(h).unwrap();
    }
}

#[test]
fn overwrite_in_place() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);

    let h = dev
        .open("/mnt/spiffs/cfg", OpenFlags::CREAT | OpenFlags::RDWR, 0)
        .unwrap();
    dev.write(&h, b"version=1").unwrap();
    assert_eq!(dev.seek(&h, -1, Whence::End), Ok(8));
    dev.write(&h, b"2").unwrap();
    assert_eq!(dev.seek(&h, 0, Whence::Set), Ok(0));

    let mut buf = [0u8; 16];
    assert_eq!(dev.read(&h, &mut buf), Ok(9));
    assert_eq!(&buf[..9], b"version=2");
    dev.close(h).unwrap();
    assert_eq!(dev.fs().hal().bus().violations(), 0);
}

#[test]
fn library_errors_become_errno() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);

    assert_eq!(
        dev.open("/mnt/spiffs/missing", OpenFlags::RDONLY, 0),
        Err(Errno::ENOENT)
    );
    assert_eq!(
        dev.open("/mnt/elsewhere/x", OpenFlags::RDONLY, 0),
        Err(Errno::ENOENT)
    );

    let h = dev
        .open("/mnt/spiffs/x", OpenFlags::CREAT | OpenFlags::WRONLY, 0)
        .unwrap();
    assert_eq!(
        dev.open(
            "/mnt/spiffs/x",
            OpenFlags::CREAT | OpenFlags::EXCL | OpenFlags::WRONLY,
            0
        ),
        Err(Errno::EEXIST)
    );
    assert_eq!(dev.seek(&h, 10, Whence::Set), Err(Errno::EINVAL));
    assert_eq!(dev.ioctl(&h, 1, 0), Err(Errno::ENOSYS));

    let _a = dev.open("/mnt/spiffs/x", OpenFlags::RDONLY, 0).unwrap();
    let _b = dev.open("/mnt/spiffs/x", OpenFlags::RDONLY, 0).unwrap();
    assert_eq!(
        dev.open("/mnt/spiffs/x", OpenFlags::RDONLY, 0),
        Err(Errno::EMFILE)
    );
    assert_eq!(
        dev.open(
            "/mnt/spiffs/a-name-far-too-long-for-the-library",
            OpenFlags::CREAT | OpenFlags::WRONLY,
            0
        ),
        Err(Errno::ENAMETOOLONG)
    );
}

#[test]
fn bus_fault_becomes_eio() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);

    let h = dev
        .open("/mnt/spiffs/x", OpenFlags::CREAT | OpenFlags::WRONLY, 0)
        .unwrap();
    dev.fs_mut().hal_mut().bus_mut().inject_fault(Some(0));
    assert_eq!(dev.write(&h, b"data"), Err(Errno::EIO));
    assert_eq!(dev.close(h), Ok(()));
}

#[test]
fn table_enforces_access_mode() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);
    let mut table: DeviceTable<'_, 1> = DeviceTable::new();
    table.register(&mut dev).unwrap();

    let w = table
        .open("/mnt/spiffs/x", OpenFlags::CREAT | OpenFlags::WRONLY, 0)
        .unwrap();
    let mut buf = [0u8; 1];
    assert_eq!(table.read(&w, &mut buf), Err(Errno::EBADF));
    table.close(w).unwrap();

    let r = table.open("/mnt/spiffs/x", OpenFlags::RDONLY, 0).unwrap();
    assert_eq!(table.write(&r, b"x"), Err(Errno::EBADF));
    table.close(r).unwrap();

    assert_eq!(
        table.open("/dev/uart0", OpenFlags::RDONLY, 0).err(),
        Some(Errno::ENODEV)
    );
}

#[test]
fn embedded_io_file() {
    let mut inst = instance();
    let mut dev = mount(&mut inst);
    let mut table: DeviceTable<'_, 1> = DeviceTable::new();
    table.register(&mut dev).unwrap();

    {
        let mut file = File::open(
            &mut table,
            "/mnt/spiffs/log.txt",
            OpenFlags::CREAT | OpenFlags::WRONLY,
            0,
        )
        .unwrap();
        file.write_all(b"line one\nline two\n").unwrap();
        file.close().unwrap();
    }

    let mut file = File::open(&mut table, "/mnt/spiffs/log.txt", OpenFlags::RDONLY, 0).unwrap();
    assert_eq!(file.stat().unwrap().st_size, 18);
    assert_eq!(file.seek(SeekFrom::Start(9)), Ok(9));
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"line two");
    assert_eq!(file.seek(SeekFrom::End(-1)), Ok(17));
    assert_eq!(file.seek(SeekFrom::Start(u64::MAX)), Err(Errno::EINVAL));
}

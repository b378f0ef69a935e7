//! Kconfig fixtures shared by several test modules.

pub const FOO_BAR: &str =
    "config FOO\n  bool \"Foo\"\n\nconfig BAR\n  bool \"Bar\"\n  depends on FOO\n";

pub const CHOICE_ABC: &str = "\
choice
\tprompt \"Pick one\"
\tdefault A

config A
\tbool \"A\"

config B
\tbool \"B\"

config C
\tbool \"C\"

endchoice
";

/// A small but complete tree: menus, a choice, typed values, select.
pub const BOARD: &str = "\
mainmenu \"Board\"

menu \"Core\"

config SMP
\tbool \"Symmetric multiprocessing\"
\tdefault y
\thelp
\t  Run on more than one core.

config NR_CPUS
\tint \"Maximum number of CPUs\"
\trange 1 64
\tdepends on SMP
\tdefault 4

config BASE_ADDR
\thex \"Base address\"
\tdefault 0x8000

config HOSTNAME
\tstring \"Host name\"
\tdefault \"board\"

endmenu

config LOG
\tbool \"Logging\"
\tselect PRINTK

config PRINTK
\tbool

choice
\tprompt \"Console\"
\tdefault CONSOLE_UART

config CONSOLE_UART
\tbool \"UART\"

config CONSOLE_USB
\tbool \"USB\"

endchoice
";
